// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use crate::config::SampleRecord;
use crate::distribution::Interval;

/// Control definitions, controller labels and the global envelope shared by every region.
/// Sample paths are relative to the samples folder.
const PREAMBLE: &str = r#"// ---------------------------------------
// DEFINITIONS
// ---------------------------------------
#define $VOLUME 7
#define $PAN 10
#define $ATTACK 71
#define $RELEASE 72


// ---------------------------------------
// CONTROLS
// ---------------------------------------

<control>

// all samples are in the folder "samples"
default_path=samples/

// labels for the controls
label_cc$VOLUME=Volume
label_cc$PAN=Pan
label_cc$ATTACK=Attack
label_cc$RELEASE=Release

// set initial volume to 100%
set_hdcc$VOLUME=1.0

// set initial pan at 50%
set_hdcc$PAN=0.5

// set initial attack control at 0%
set_hdcc$ATTACK=0.0

// set initial release control at 50%
set_hdcc$RELEASE=0.5


// ---------------------------------------
// GLOBALS
// ---------------------------------------

<global>
ampeg_attack=0 // seconds
ampeg_decay=0 // seconds
ampeg_sustain=100 // %

// full volume control
amplitude_oncc$VOLUME=100 // %
amplitude_curvecc$VOLUME=4

// full pan control
pan_oncc$PAN=100 // %
pan_curvecc$PAN=1

// full-scale for attack control
ampeg_attack_oncc$ATTACK=0.25 // seconds

// full-scale for release control
ampeg_release_oncc$RELEASE=2 // seconds


// ---------------------------------------
// SAMPLES
// ---------------------------------------

<group>

"#;

/// One sample mapped onto a box of keys and velocities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Path of the sample, relative to the samples folder.
    pub sample_path: String,
    /// The key the sample was recorded at.
    pub key: u8,
    pub keys: Interval,
    pub velocities: Interval,
}

impl Region {
    /// Maps a planned sample to a region, its audio file named after the sample.
    pub fn from_sample(sample: &SampleRecord, extension: &str) -> Region {
        Region {
            sample_path: format!("{}.{}", sample.sample_name, extension),
            key: sample.note_number,
            keys: sample.note_interval,
            velocities: sample.velocity_interval,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<region> sample={} key={} lokey={} hikey={} lovel={} hivel={}",
            self.sample_path,
            self.key,
            self.keys.first,
            self.keys.last,
            self.velocities.first,
            self.velocities.last,
        )
    }
}

/// Renders a complete instrument definition, regions in the given order.
pub fn render(regions: &[Region]) -> String {
    let mut document = String::from(PREAMBLE);
    for region in regions {
        document.push_str(&region.to_string());
        document.push('\n');
    }
    document
}

#[cfg(test)]
mod test {
    use super::{render, Region};
    use crate::config::SampleRecord;
    use crate::distribution::Interval;

    fn sample() -> SampleRecord {
        SampleRecord {
            sample_name: "C4v80".to_string(),
            note_number: 60,
            velocity: 80,
            time_start: 5.0,
            time_end: 30.0,
            note_interval: Interval::new(55, 66),
            velocity_interval: Interval::new(64, 95),
        }
    }

    #[test]
    fn region_line() {
        let region = Region::from_sample(&sample(), "flac");
        assert_eq!(
            "<region> sample=C4v80.flac key=60 lokey=55 hikey=66 lovel=64 hivel=95",
            region.to_string()
        );
    }

    #[test]
    fn document_layout() {
        let mut second = sample();
        second.sample_name = "C4v110".to_string();
        second.velocity_interval = Interval::new(96, 127);
        let regions = vec![
            Region::from_sample(&sample(), "flac"),
            Region::from_sample(&second, "flac"),
        ];

        let document = render(&regions);
        assert!(document.contains("#define $VOLUME 7\n"));
        assert!(document.contains("#define $RELEASE 72\n"));
        assert!(document.contains("<control>\n"));
        assert!(document.contains("default_path=samples/\n"));
        assert!(document.contains("<global>\n"));

        let region_lines: Vec<&str> = document
            .lines()
            .filter(|line| line.starts_with("<region>"))
            .collect();
        assert_eq!(2, region_lines.len());
        assert!(region_lines[0].contains("sample=C4v80.flac"));
        assert!(region_lines[1].contains("sample=C4v110.flac"));

        // Regions come after the group header.
        let group = document.find("<group>").unwrap_or(usize::MAX);
        let first_region = document.find("<region>").unwrap_or(0);
        assert!(group < first_region);
    }

    #[test]
    fn empty_instrument() {
        let document = render(&[]);
        assert!(document.ends_with("<group>\n\n"));
        assert!(!document.contains("<region>"));
    }
}

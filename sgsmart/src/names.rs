use std::collections::HashMap;


/// Description returned for ids that are not in the table.
pub const UNKNOWN_ATTRIBUTE: &str = "Unknown";

const STANDARD_NAMES: &[(u8, &str)] = &[
    (1, "Read Error Rate"),
    (2, "Throughput Performance"),
    (3, "Spin-Up Time"),
    (4, "Start/Stop Count"),
    (5, "Reallocated Sectors Count"),
    (6, "Read Channel Margin"),
    (7, "Seek Error Rate"),
    (8, "Seek Time Performance"),
    (9, "Power-On Hours"),
    (10, "Spin Retry Count"),
    (11, "Recalibration Retries"),
    (12, "Power Cycle Count"),
    (13, "Soft Read Error Rate"),
    (22, "Current Helium Level"),
    (170, "Available Reserved Space"),
    (171, "SSD Program Fail Count"),
    (172, "SSD Erase Fail Count"),
    (173, "SSD Wear Leveling Count"),
    (174, "Unexpected Power Loss Count"),
    (175, "Power Loss Protection Failure"),
    (177, "Wear Range Delta"),
    (179, "Used Reserved Block Count Total"),
    (180, "Unused Reserved Block Count Total"),
    (181, "Program Fail Count Total"),
    (182, "Erase Fail Count"),
    (183, "SATA Downshift Error Count"),
    (184, "End-to-End Error"),
    (187, "Reported Uncorrectable Errors"),
    (188, "Command Timeout"),
    (189, "High Fly Writes"),
    (190, "Airflow Temperature"),
    (191, "G-Sense Error Rate"),
    (192, "Power-off Retract Count"),
    (193, "Load Cycle Count"),
    (194, "Temperature"),
    (195, "Hardware ECC Recovered"),
    (196, "Reallocation Event Count"),
    (197, "Current Pending Sector Count"),
    (198, "Uncorrectable Sector Count"),
    (199, "UltraDMA CRC Error Count"),
    (200, "Multi-Zone Error Rate"),
    (201, "Soft Read Error Rate"),
    (202, "Data Address Mark Errors"),
    (203, "Run Out Cancel"),
    (204, "Soft ECC Correction"),
    (205, "Thermal Asperity Rate"),
    (206, "Flying Height"),
    (207, "Spin High Current"),
    (208, "Spin Buzz"),
    (209, "Offline Seek Performance"),
    (220, "Disk Shift"),
    (221, "G-Sense Error Rate"),
    (222, "Loaded Hours"),
    (223, "Load/Unload Retry Count"),
    (224, "Load Friction"),
    (225, "Load/Unload Cycle Count"),
    (226, "Load 'In'-time"),
    (227, "Torque Amplification Count"),
    (228, "Power-Off Retract Cycle"),
    (230, "GMR Head Amplitude"),
    (231, "Life Left"),
    (232, "Endurance Remaining"),
    (233, "Media Wearout Indicator"),
    (234, "Average Erase Count"),
    (235, "Good Block Count"),
    (240, "Head Flying Hours"),
    (241, "Total LBAs Written"),
    (242, "Total LBAs Read"),
    (243, "Total LBAs Written Expanded"),
    (244, "Total LBAs Read Expanded"),
    (249, "NAND Writes (1GiB)"),
    (250, "Read Error Retry Rate"),
    (251, "Minimum Spares Remaining"),
    (252, "Newly Added Bad Flash Block"),
    (254, "Free Fall Protection"),
];


/// Read-only mapping from SMART attribute id to a human readable description.
///
/// Built once at startup and handed to the parser by reference.
#[derive(Debug, Clone, Default)]
pub struct AttributeNames {
    names: HashMap<u8, String>,
}

impl AttributeNames {
    /// The commonly agreed-upon attribute names.
    pub fn standard() -> Self {
        STANDARD_NAMES.iter().copied().collect()
    }

    pub fn lookup(&self, id: u8) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNKNOWN_ATTRIBUTE)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u8, S)> for AttributeNames {
    fn from_iter<I: IntoIterator<Item = (u8, S)>>(iter: I) -> Self {
        AttributeNames {
            names: iter.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}

// src/schema/regions.rs

/// Region code → archive entry holding that region's records.
pub static REGIONS: &[(&str, &str)] = &[
    ("PHA", "00.csv"),
    ("STC", "01.csv"),
    ("JHC", "02.csv"),
    ("PLK", "03.csv"),
    ("ULK", "04.csv"),
    ("HKK", "05.csv"),
    ("JHM", "06.csv"),
    ("MSK", "07.csv"),
    ("OLK", "14.csv"),
    ("ZLK", "15.csv"),
    ("VYS", "16.csv"),
    ("PAK", "17.csv"),
    ("LBK", "18.csv"),
    ("KVK", "19.csv"),
];

/// Archive entry name for `region`, if the code is known.
pub fn entry_name(region: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(code, _)| *code == region)
        .map(|(_, entry)| *entry)
}

/// All known region codes in table order.
pub fn region_codes() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(code, _)| *code)
}

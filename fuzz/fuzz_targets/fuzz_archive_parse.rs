#![no_main]

use bnk_rs::{AddOptions, BnkArchive, BnkEntry, RemoveOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to parse - should never panic
    let mut archive = match BnkArchive::from_bytes("fuzz.bnk", data) {
        Ok(a) => a,
        Err(_) => return, // Expected for invalid data
    };

    // Decode every entry - integrity errors are fine, panics are not
    for entry in archive.entries() {
        let _ = entry.decompressed_data();
        let _ = entry.wrap().to_entry();
    }

    // Lookups with odd names - should never panic
    let _ = archive.has_entry("");
    let _ = archive.has_entry("../../../etc/passwd");
    let _ = archive.remove_entry("\u{0}", RemoveOptions::ignore_not_found());

    if let Ok(entry) = BnkEntry::raw("FUZZ.DAT", vec![0xAB; 16]) {
        let _ = archive.add_entry(&entry, AddOptions::replace());
    }

    // Re-serialize and re-parse: must load and be stable from here on
    let first = match archive.to_bytes() {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    let mut reloaded = BnkArchive::from_bytes("fuzz.bnk", &first).expect("saved archive must load");
    let second = reloaded.to_bytes().expect("reloaded archive must save");
    assert_eq!(first, second);
});

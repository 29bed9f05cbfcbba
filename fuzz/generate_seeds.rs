//! Generate seed corpus for fuzzing

use bnk_rs::{AddOptions, BnkArchive, BnkEntry};
use std::fs;

fn empty_image() -> Vec<u8> {
    let mut image = bnk_rs::FOOTER_MAGIC.to_vec();
    image.extend_from_slice(&0u32.to_le_bytes());
    image
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_archive_parse";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    let seeds: Vec<(&str, Vec<BnkEntry>)> = vec![
        ("seed_empty.bnk", vec![]),
        (
            "seed_single_raw.bnk",
            vec![BnkEntry::raw("HELLO.TXT", b"Hello, World!".to_vec())?],
        ),
        (
            "seed_compressed.bnk",
            vec![
                // Four literals, then a self-overlapping 12-byte run
                BnkEntry::new("RUN.SPR", vec![0x0F, b'A', b'B', b'C', b'D', 0xEE, 0xF9], 16, true)?,
                BnkEntry::raw("TITLE.PAL", vec![0x3F; 768])?,
            ],
        ),
    ];

    for (file_name, entries) in seeds {
        let path = format!("{}/{}", corpus_dir, file_name);
        let mut archive = BnkArchive::from_bytes(&path, &empty_image())?;
        for entry in &entries {
            archive.add_entry(entry, AddOptions::default())?;
        }
        archive.save()?;
        println!("Generated: {}", path);
    }

    Ok(())
}

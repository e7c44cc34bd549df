//! Man page generator for iceflash
//!
//! Writes `iceflash.1` plus one `iceflash-<command>.1` page per subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::io;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;
#[allow(dead_code)]
#[path = "../programmers.rs"]
mod programmers;

/// Render the top-level page and a page per subcommand as (file name, roff)
fn render_pages(cmd: clap::Command) -> io::Result<Vec<(String, Vec<u8>)>> {
    let name = cmd.get_name().to_string();
    let mut pages = Vec::new();

    for sub in cmd.get_subcommands() {
        let title = format!("{}-{}", name, sub.get_name());
        let mut roff = Vec::new();
        clap_mangen::Man::new(sub.clone())
            .title(title.clone())
            .render(&mut roff)?;
        pages.push((format!("{}.1", title), roff));
    }

    let mut roff = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut roff)?;
    pages.insert(0, (format!("{}.1", name), roff));
    Ok(pages)
}

fn main() -> io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    for (file, roff) in render_pages(cli::Cli::command())? {
        let path = output_dir.join(file);
        fs::write(&path, roff)?;
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_cover_subcommands() {
        let pages = render_pages(cli::Cli::command()).unwrap();
        let names: Vec<&str> = pages.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names[0], "iceflash.1");
        for sub in ["iceflash-write.1", "iceflash-erase.1", "iceflash-read.1"] {
            assert!(names.contains(&sub), "missing {}", sub);
        }
        assert!(pages.iter().all(|(_, roff)| !roff.is_empty()));
    }
}

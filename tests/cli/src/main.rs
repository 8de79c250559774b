use std::env;
use std::error::Error;

use glyf_subset::{subset, GlyphRemapper};

fn parse_gids(gids: &str, num_glyphs: u16) -> Result<Vec<u16>, Box<dyn Error>> {
    if gids == "*" {
        return Ok((0..num_glyphs).collect());
    }

    let split = gids.split(',').filter(|s| !s.is_empty()).collect::<Vec<_>>();
    let mut gids = vec![];

    for el in &split {
        if let Some((first, second)) = el.split_once('-') {
            let first = first.parse::<u16>()?;
            let second = second.parse::<u16>()?;

            gids.extend(first..=second);
        } else {
            gids.push(el.parse::<u16>()?);
        }
    }

    Ok(gids)
}

// Note that this is more of an experimental CLI used for testing.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = args.get(1) else {
        return Err("usage: cli <input> [output] [gids]".into());
    };

    let data = std::fs::read(input)?;
    let num_glyphs = ttf_parser::Face::parse(&data, 0)?.number_of_glyphs();
    let gids = parse_gids(args.get(3).map_or("0-5", String::as_str), num_glyphs)?;

    // Keep .notdef at index 0.
    let mut remapper = GlyphRemapper::new();
    remapper.remap(0);
    for &gid in &gids {
        remapper.remap(gid);
    }

    let sub = subset(&data, 0, &mut remapper)?;
    log::info!(
        "subsetted {} requested glyphs to {} glyphs ({} -> {} bytes)",
        gids.len(),
        remapper.len(),
        data.len(),
        sub.len(),
    );

    std::fs::write(args.get(2).map_or("res.ttf", String::as_str), sub)?;
    Ok(())
}

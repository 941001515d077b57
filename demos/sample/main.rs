use std::env;
use std::fs;

use anyhow::Context;

const SAMPLE: &str = "list {str{item0}, str {ite
m1}, num { 3.14 },
num {3e8}}";

fn main() -> anyhow::Result<()> {
    let text = match env::args().nth(1) {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?
        }
        None => SAMPLE.to_string(),
    };

    let value = taglit::parse(&text).context("failed to parse document")?;
    println!("{}", value);
    Ok(())
}

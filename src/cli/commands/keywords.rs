//! Print the built-in keyword vocabulary.

use console::style;

use crate::analysis::default_vocabulary;

/// List the keywords a scan searches for, in query order.
pub fn cmd_keywords() -> anyhow::Result<()> {
    let vocabulary = default_vocabulary();
    println!(
        "{} {} keywords searched per year",
        style("→").cyan(),
        vocabulary.len()
    );
    for keyword in vocabulary {
        println!("  {}", keyword);
    }
    Ok(())
}

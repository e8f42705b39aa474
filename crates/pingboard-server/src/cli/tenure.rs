use crate::cli::TenureArgs;
use anyhow::Result;
use chrono::NaiveDate;
use pingboard_core::describe_tenure;

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

pub async fn run(args: TenureArgs) -> Result<()> {
    let start = parse_date(&args.start)?;
    let reference = match args.on.as_deref() {
        Some(on) => parse_date(on)?,
        None => chrono::Local::now().date_naive(),
    };

    let tenure = describe_tenure(start, reference);
    if tenure.is_empty() {
        println!("(starts {})", start);
    } else {
        println!("{}", tenure);
    }
    Ok(())
}

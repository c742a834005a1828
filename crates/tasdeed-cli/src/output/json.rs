use tasdeed_core::error::TasdeedError;
use tasdeed_core::model::DocumentResult;

pub fn print(result: &DocumentResult) -> Result<(), TasdeedError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

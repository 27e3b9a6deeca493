// demos/year_table.rs
//
// Prints the last year of noon temperatures with their yarn band, then the
// number of days per band. Pass a JSON band table as the first argument to
// use your own yarn set.
use temperature_blanket::{BandTable, BlanketError, TemperatureBlanket};

#[tokio::main]
async fn main() -> Result<(), BlanketError> {
    // Set RUST_LOG=info (or debug) to see cache hits and fetches
    env_logger::init();

    let mut blanket = TemperatureBlanket::new().await?;
    if let Some(path) = std::env::args().nth(1) {
        let json = std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Could not read band table {}: {}", path, e);
            std::process::exit(1);
        });
        blanket = blanket.with_bands(BandTable::from_json(&json)?);
    }

    let year = match blanket.year().call().await {
        Ok(year) => year,
        Err(e) => {
            eprintln!("Could not load data: {}", e);
            return Err(e);
        }
    };

    println!("{:<12} {:>8}  {:<12} {}", "Date", "Noon °C", "Band", "Color");
    for day in &year.days {
        let temperature = day
            .reading
            .temperature
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{:<12} {:>8}  {:<12} {}",
            day.reading.date.format("%d.%m.%Y"),
            temperature,
            day.band.label,
            day.band.color_code
        );
    }

    println!();
    for (band, count) in year.counts.rows(blanket.bands()) {
        println!("{:<12} {:<14} {:>4} days", band.label, band.describe(), count);
    }
    Ok(())
}

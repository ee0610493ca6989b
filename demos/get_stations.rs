use woudc::{WoudcClient, WoudcError};

#[tokio::main]
async fn main() -> Result<(), WoudcError> {
    let client = WoudcClient::new()?;

    let stations = client.metadata().stations().await?;
    println!("WOUDC has {} stations", stations.features.len());

    for station in stations.features.iter().take(10) {
        let id = station.property("woudc_id").and_then(|v| v.as_str());
        let name = station.property("name").and_then(|v| v.as_str());
        println!("{:>5}  {}", id.unwrap_or("?"), name.unwrap_or("?"));
    }

    Ok(())
}

use woudc::{WoudcClient, WoudcError};

#[tokio::main]
async fn main() -> Result<(), WoudcError> {
    let client = WoudcClient::new()?;

    // Total ozone over Canada between November 2000 and October 2001, newest first
    let data = client
        .get_data("totalozone")
        .bbox([-142.0, 42.0, -53.0, 84.0])
        .temporal("2000-11-11/2001-10-30")
        .sort_order("D")
        .variables(["platform_name", "daily_date", "daily_columnO3"])
        .call()
        .await?;

    if let Some(collection) = data.collection() {
        println!("{} observations", collection.features.len());
        for feature in collection.features.iter().take(5) {
            println!("{:?}", feature.properties);
        }
    }

    Ok(())
}

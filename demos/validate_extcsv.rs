use std::env;
use std::fs;
use woudc::{ProcessStatus, WoudcClient, WoudcError};

#[tokio::main]
async fn main() -> Result<(), WoudcError> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: validate_extcsv <file.csv>");
        return Ok(());
    };
    let Ok(extcsv) = fs::read_to_string(&path) else {
        eprintln!("could not read {path}");
        return Ok(());
    };

    let client = WoudcClient::new()?;

    match client.data_extcsv(&extcsv).await {
        Ok(result) => println!("{path} is valid Extended CSV ({:?})", result.status),
        Err(e) if e.is_invalid_argument() => {
            println!("{path} was rejected: {e}");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    let qa = client.data_qa(&extcsv).await?;
    if let ProcessStatus::Succeeded(message) = &qa.status {
        println!("QA: {message}");
    }
    for output in &qa.outputs {
        println!("{}: {}", output.identifier, output.value);
    }

    Ok(())
}

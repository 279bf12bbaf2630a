use rsampquery::error::SampQueryError;
use rsampquery::query::SampQuery;

#[tokio::main]
async fn main() -> Result<(), SampQueryError> {
    let query = SampQuery::default();
    let info = query.server_info().await?;
    dbg!(info);

    Ok(())
}

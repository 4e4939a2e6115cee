use expertise_db::{connect_with_settings, ExpertiseRepository, SqlExpertiseRepository};
use serde_json::json;

use crate::commands::{prepare, CommandResult};

/// Dumps stored records as JSON, optionally narrowed to one workspace.
pub fn run(team_id: Option<&str>) -> CommandResult {
    let (config, runtime) = match prepare("experts") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let records = SqlExpertiseRepository::new(pool.clone())
            .find_all()
            .await
            .map_err(|error| ("store_read", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(records)
    });

    let records = match result {
        Ok(records) => records,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("experts", error_class, message, exit_code);
        }
    };

    let records: Vec<_> = records
        .into_iter()
        .filter(|record| team_id.map_or(true, |team_id| record.team_id.0 == team_id))
        .collect();

    CommandResult::success_with_data(
        "experts",
        format!("{} record(s)", records.len()),
        json!({ "records": records }),
    )
}

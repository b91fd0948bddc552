//! Initialize ecotrack in a directory

use std::fs;

use super::Context;
use ecotrack::output::{OperationResult, OutputMode, Render};
use ecotrack::paths;

const PROJECT_TEMPLATE: &str = r#"# ecotrack project settings

[survey]
# Surveyor used when --surveyor is not given
# default_surveyor = "USER001"

[report]
trailing_days = 7
recent_anomalies = 5
top_districts = 10

# Override the built-in bands (amounts in FCFA):
# [rules.categories.housing]
# max = 60000
#
# [rules.levels.doctorate]
# min_age = 24
# max_age = 40
"#;

/// Create `ecotrack.toml` and an empty dataset
pub fn init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let config_path = paths::project_config(&ctx.root);

    if config_path.exists() && !force {
        OperationResult {
            success: false,
            message: "Already initialized (ecotrack.toml exists).\nUse --force to reinitialize."
                .to_string(),
        }
        .render(ctx.mode);
        return Ok(());
    }

    fs::write(&config_path, PROJECT_TEMPLATE)?;
    ctx.store.flush()?;

    if ctx.mode == OutputMode::Json {
        OperationResult::ok("initialized").render(ctx.mode);
        return Ok(());
    }

    println!("Initializing ecotrack...\n");
    println!("  Created {}", config_path.display());
    if let Some(dataset) = ctx.store.backing_file() {
        println!("  Created {}", dataset.display());
    }
    println!("\necotrack initialized!");
    println!("\nNext steps:");
    println!("  ecotrack surveyor add <user> --code <CODE>");
    println!("  ecotrack --surveyor <CODE> student add --code S-001 --name \"...\" --sex female");

    Ok(())
}

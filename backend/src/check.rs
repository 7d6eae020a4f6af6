use log::{error, info, warn};
use shared::service::bootstrap;
use shared::{Endpoint, ServiceState};
use strum::IntoEnumIterator;

use crate::client::ApiClient;
use crate::config::Settings;
use crate::error::{AppError, Result};

/// Probes `/health` then `/features` and reports what each form would require.
pub async fn run_check(settings: Settings) -> Result<()> {
    let client = ApiClient::new(settings.api)?;
    info!("Checking {}", client.config().base_url);

    match bootstrap(&client).await {
        ServiceState::Connected(features) => {
            for endpoint in Endpoint::iter() {
                info!("{}: {}", endpoint, features.required_for(endpoint).join(", "));
            }
            Ok(())
        }
        ServiceState::Degraded(message) => {
            warn!("{}", message);
            Err(AppError::Unavailable(message))
        }
        ServiceState::Disconnected(message) => {
            error!("{}", message);
            Err(AppError::Unavailable(message))
        }
        ServiceState::Checking => Err(AppError::Unavailable("no answer".into())),
    }
}

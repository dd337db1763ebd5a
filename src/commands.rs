use crate::cache::RefreshCell;
use crate::client::BraviaClient;
use crate::error::{BraviaError, Result};
use crate::protocol::{str_field, Request, Service};
use crate::report::Reporting;
use crate::types::CommandEntry;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Error message the TV sends when queried while in standby
const NOT_POWERED_ON: &str = "not power-on";

/// Command name to IRCC code table, in the order the TV lists them
pub(crate) type CommandTable = RefreshCell<IndexMap<String, String>>;

/// Parse the command list at `result[1]` of `getRemoteControllerInfo`
fn parse_commands(result: &[Value]) -> Result<IndexMap<String, String>> {
    let entries = result
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| BraviaError::InvalidResponse("No command list in response".to_string()))?;

    let mut table = IndexMap::with_capacity(entries.len());
    for entry in entries {
        if let (Some(name), Some(code)) = (str_field(entry, "name"), str_field(entry, "value")) {
            // The first code listed for a name wins
            table.entry(name).or_insert(code);
        }
    }
    Ok(table)
}

impl BraviaClient {
    /// Fetch the full command list from the TV
    ///
    /// Returns `None` on failure or when the list is empty. A TV in standby
    /// refuses the query with "not power-on"; that is expected and not
    /// reported.
    async fn fetch_commands(&self) -> Option<IndexMap<String, String>> {
        let path = Service::System.path();
        let request = Request::new("getRemoteControllerInfo");

        let result = match self
            .transport
            .call(Service::System, &request, Reporting::Suppress)
            .await
            .and_then(|result| parse_commands(&result))
        {
            Ok(table) => table,
            Err(BraviaError::Api { message, .. }) if message.contains(NOT_POWERED_ON) => {
                tracing::debug!("TV is not powered on, command list unavailable");
                return None;
            }
            Err(error) => {
                self.transport.record(&path, &error, Reporting::Report);
                return None;
            }
        };

        if result.is_empty() {
            // Sets still booting answer with an empty list; ask again next time
            tracing::debug!("TV returned no remote control commands");
            return None;
        }

        tracing::debug!(count = result.len(), "Loaded remote control commands");
        Some(result)
    }

    async fn command_table(&self) -> Option<Arc<IndexMap<String, String>>> {
        self.commands
            .get_or_refresh(|| self.fetch_commands())
            .await
    }

    /// Look up the IRCC code for a command name such as `VolumeUp`
    ///
    /// The command list is fetched on first use and cached until
    /// `invalidate_commands` is called. Unknown names return `None` without
    /// another fetch.
    pub async fn command_code(&self, name: &str) -> Option<String> {
        self.command_table().await?.get(name).cloned()
    }

    /// All cached commands, fetching them if necessary
    pub async fn commands(&self) -> Vec<CommandEntry> {
        self.command_table()
            .await
            .map(|table| {
                table
                    .iter()
                    .map(|(name, code)| CommandEntry {
                        name: name.clone(),
                        code: code.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Refetch the command list, replacing the cached one on success
    ///
    /// Returns the number of commands now cached.
    pub async fn refresh_commands(&self) -> usize {
        self.commands
            .refresh_with(|| self.fetch_commands())
            .await
            .map_or(0, |table| table.len())
    }

    /// Forget the cached command list
    pub async fn invalidate_commands(&self) {
        self.commands.invalidate().await;
    }

    /// Send a raw IRCC code
    pub async fn send_ircc(&self, code: &str) -> Result<()> {
        self.transport.send_ircc(code, Reporting::Report).await?;
        Ok(())
    }

    /// Send a named remote control command
    ///
    /// Returns `Ok(false)` without touching the network when the TV does not
    /// advertise `name`.
    pub async fn send_command(&self, name: &str) -> Result<bool> {
        let Some(code) = self.command_code(name).await else {
            tracing::debug!(command = name, "Command unavailable, not sent");
            return Ok(false);
        };
        self.send_ircc(&code).await?;
        Ok(true)
    }
}

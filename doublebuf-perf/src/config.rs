use eyre::bail;

/// One entry of the config file
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RunConfig {
    pub name: String,
    pub backend: Backend,
    pub buffer_len: usize,
    /// how many generations the producer publishes
    pub updates: u64,
    /// max number of spins between two producer attempts
    #[serde(default)]
    pub producer_spin: u32,
    /// max number of spins between two consumer attempts
    #[serde(default)]
    pub consumer_spin: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    Inline,
    Boxed,
    Mutex,
}

pub fn parse(config: &[u8]) -> eyre::Result<Vec<RunConfig>> {
    let config: Vec<RunConfig> = serde_json::from_slice(config)?;

    for entry in &config {
        if entry.buffer_len == 0 {
            bail!("Run {:?} has an empty buffer, torn reads can't be detected", entry.name)
        }
    }

    Ok(config)
}

pub fn total_updates(config: &[RunConfig]) -> eyre::Result<u64> {
    let Some(total) = config
        .iter()
        .try_fold(0u64, |acc, entry| entry.updates.checked_add(acc))
    else {
        bail!("Total number of updates overflowed u64")
    };

    Ok(total)
}

use crate::GenError;

/// Knobs for the emitted source.
///
/// Parsed from the request `parameter` string, a comma separated list of
/// `key=value` pairs:
///
/// ```
/// use fastjsonpb_gen::GeneratorOptions;
///
/// let options: GeneratorOptions = "runtime_path=crate::rt, pools_name=Arena".parse().unwrap();
/// assert_eq!(options.runtime_path, "crate::rt");
/// assert_eq!(options.pools_name, "Arena");
///
/// assert!("runtime=x".parse::<GeneratorOptions>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Path under which the generated code finds the runtime crate.
    ///
    /// # Default
    ///
    /// `::fastjsonpb`
    pub runtime_path: String,

    /// Name of the generated struct holding one pool per message type.
    ///
    /// # Default
    ///
    /// `Pools`
    pub pools_name: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_path: "::fastjsonpb".into(),
            pools_name: "Pools".into(),
        }
    }
}

impl core::str::FromStr for GeneratorOptions {
    type Err = GenError;

    fn from_str(parameter: &str) -> Result<Self, Self::Err> {
        let mut options = Self::default();
        for pair in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| GenError::InvalidParameter(pair.into()))?;
            if value.is_empty() {
                return Err(GenError::InvalidParameter(pair.into()));
            }
            match key {
                "runtime_path" => options.runtime_path = value.into(),
                "pools_name" => options.pools_name = value.into(),
                _ => return Err(GenError::InvalidParameter(pair.into())),
            }
        }
        Ok(options)
    }
}

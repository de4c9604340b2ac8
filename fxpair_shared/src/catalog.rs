use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// One recorded note instance from the sample catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    #[serde(rename = "fileID")]
    pub file_id: String,
    #[serde(deserialize_with = "de_number")]
    pub play_style: u32,
    #[serde(deserialize_with = "de_number")]
    pub instrument_setting: u32,
    #[serde(deserialize_with = "de_number")]
    pub fx_type: u32,
    #[serde(deserialize_with = "de_number")]
    pub fx_setting: u32,
    #[serde(deserialize_with = "de_number")]
    pub string: u8,
    #[serde(deserialize_with = "de_number")]
    pub fret: u8,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub midi: Option<u8>,
    /// Explicit take number shared by the dry and effected recordings of the
    /// same performance. Absent in older catalogs.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub take: Option<u32>,
}

/// Identity of a performed note, shared by its dry and effected recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteKey {
    pub string: u8,
    pub fret: u8,
    pub take: u32,
}

/// One effect configuration, looked up by genre name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub genre: String,
    /// Folder name of the effect under the samples root.
    #[serde(rename = "fxType")]
    pub effect_folder: String,
    #[serde(rename = "fxTypeID", deserialize_with = "de_number")]
    pub fx_type_id: u32,
    #[serde(rename = "fxSetting", default)]
    pub fx_setting_name: Option<String>,
    #[serde(rename = "fxSettingID", deserialize_with = "de_number")]
    pub fx_setting_id: u32,
}

// The upstream extraction pipeline writes every field as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn parse_number<T, E>(raw: NumberOrText) -> Result<Option<T>, E>
where
    T: TryFrom<u64> + FromStr,
    <T as TryFrom<u64>>::Error: Display,
    <T as FromStr>::Err: Display,
    E: serde::de::Error,
{
    match raw {
        NumberOrText::Number(n) => T::try_from(n).map(Some).map_err(E::custom),
        NumberOrText::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<T>().map(Some).map_err(E::custom)
        }
    }
}

fn de_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as TryFrom<u64>>::Error: Display,
    <T as FromStr>::Err: Display,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    parse_number::<T, D::Error>(raw)?.ok_or_else(|| D::Error::custom("empty numeric field"))
}

fn de_opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as TryFrom<u64>>::Error: Display,
    <T as FromStr>::Err: Display,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(raw) => parse_number::<T, D::Error>(raw),
        None => Ok(None),
    }
}

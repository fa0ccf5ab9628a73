use serde::Deserialize;

/// One country entry in the `data` array of a countries response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub currency_codes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wiki_data_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Absent or `null` means the server did not report a total.
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub current_offset: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// The response envelope: `{ "metadata": {...}, "data": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountriesResponse {
    #[serde(default)]
    pub metadata: PageMetadata,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<CountryDto>,
}

/// A decoded page, tagged with the offset it was requested at.
#[derive(Debug, Clone, Default)]
pub struct CountriesPage {
    pub records: Vec<CountryDto>,
    pub total_count: Option<usize>,
    pub offset: usize,
}

impl CountriesPage {
    pub fn from_response(response: CountriesResponse, requested_offset: usize) -> Self {
        let offset = response
            .metadata
            .offset
            .or(response.metadata.current_offset)
            .unwrap_or(requested_offset);
        Self {
            records: response.data,
            total_count: response.metadata.total_count,
            offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

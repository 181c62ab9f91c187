//! Item normalizado da integração e o mapper de registros crus da API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag de tipo usada para contatos
pub const CONTACT_ITEM_TYPE: &str = "Contact";

/// Registro normalizado, independente do formato do provedor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
    /// ID do provedor + "_" + tipo
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub parent_id: Option<String>,
    pub parent_path_or_name: Option<String>,
    pub creation_time: Option<String>,
    pub last_modified_time: Option<String>,
}

/// Converte um registro cru da HubSpot em [`IntegrationItem`].
///
/// Função pura e total: campos ausentes ou de tipo inesperado viram string
/// vazia (id, nomes) ou `None` (timestamps). O nome é exatamente "first last"
/// (sem trim) quando algum dos dois é não vazio; caso contrário cai para o id cru.
pub fn create_integration_item(
    raw: &Value,
    item_type: &str,
    parent_id: Option<&str>,
    parent_name: Option<&str>,
) -> IntegrationItem {
    let raw_id = str_field(raw, "id");
    let properties = raw.get("properties");
    let first = properties.map(|p| str_field(p, "firstname")).unwrap_or_default();
    let last = properties.map(|p| str_field(p, "lastname")).unwrap_or_default();

    let name = if first.is_empty() && last.is_empty() {
        raw_id.clone()
    } else {
        format!("{} {}", first, last)
    };

    IntegrationItem {
        id: format!("{}_{}", raw_id, item_type),
        name,
        item_type: item_type.to_string(),
        parent_id: parent_id.map(str::to_string),
        parent_path_or_name: parent_name.map(str::to_string),
        creation_time: raw.get("createdAt").and_then(Value::as_str).map(str::to_string),
        last_modified_time: raw.get("updatedAt").and_then(Value::as_str).map(str::to_string),
    }
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

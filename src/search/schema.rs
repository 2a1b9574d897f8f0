//! Search index schema over property documents

use crate::models::PROPERTY_KEY_PREFIX;
use crate::state::PropertyStore;
use crate::error::Result;

/// How the store indexes a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Geo,
    Numeric,
    Tag,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Geo => "GEO",
            FieldKind::Numeric => "NUMERIC",
            FieldKind::Tag => "TAG",
        }
    }
}

/// A JSON path exposed to queries under an alias
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub path: String,
    pub alias: String,
    pub kind: FieldKind,
    pub sortable: bool,
}

impl SchemaField {
    fn new(path: &str, alias: &str, kind: FieldKind, sortable: bool) -> Self {
        Self {
            path: path.to_string(),
            alias: alias.to_string(),
            kind,
            sortable,
        }
    }
}

/// Index declaration: name, document prefix and field mappings
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    pub name: String,
    pub prefix: String,
    pub fields: Vec<SchemaField>,
}

impl IndexSchema {
    /// The property index: geo coords, sortable rate, type tag and per-interval bounds
    pub fn property_index(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: PROPERTY_KEY_PREFIX.to_string(),
            fields: vec![
                SchemaField::new("$.address.coords", "coords", FieldKind::Geo, true),
                SchemaField::new("$.rate", "rate", FieldKind::Numeric, true),
                SchemaField::new("$.type", "type", FieldKind::Tag, false),
                SchemaField::new("$.availability[*].begin", "begin", FieldKind::Numeric, false),
                SchemaField::new("$.availability[*].end", "end", FieldKind::Numeric, false),
            ],
        }
    }

    pub fn field(&self, alias: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.alias == alias)
    }

    /// Arguments following `FT.CREATE`
    pub fn create_args(&self) -> Vec<String> {
        let mut args = vec![
            self.name.clone(),
            "ON".to_string(),
            "JSON".to_string(),
            "PREFIX".to_string(),
            "1".to_string(),
            self.prefix.clone(),
            "SCHEMA".to_string(),
        ];

        for field in &self.fields {
            args.push(field.path.clone());
            args.push("AS".to_string());
            args.push(field.alias.clone());
            args.push(field.kind.as_str().to_string());
            if field.sortable {
                args.push("SORTABLE".to_string());
            }
        }

        args
    }
}

/// Drop any existing index of the same name, then create it
pub async fn recreate_index(store: &dyn PropertyStore, schema: &IndexSchema) -> Result<()> {
    if let Err(e) = store.drop_index(&schema.name).await {
        tracing::debug!(index = %schema.name, error = %e, "No previous index to drop");
    }

    store.create_index(schema).await?;
    tracing::info!(index = %schema.name, fields = schema.fields.len(), "Search index created");
    Ok(())
}

//! Mapping vocabulary: fields, associations, tables and the enumerations
//! annotations are parsed into.

use std::collections::BTreeMap;
use std::fmt;

use flowmeta_foundation::{
    ColumnAnnotation, Error, JoinColumnAnnotation, JoinTableAnnotation, MappingError, Result,
};
use serde::{Deserialize, Serialize};

fn upper(value: &str) -> String {
    value.trim().to_uppercase()
}

/// When associated entities are loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    /// On first access.
    #[default]
    Lazy,
    /// Together with the owner.
    Eager,
    /// Collections are not loaded for counting or membership checks.
    ExtraLazy,
}

impl FetchMode {
    /// Parses a fetch mode name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Fails for names other than LAZY, EAGER and `EXTRA_LAZY`.
    pub fn parse(class_name: &str, value: &str) -> Result<Self> {
        match upper(value).as_str() {
            "LAZY" => Ok(Self::Lazy),
            "EAGER" => Ok(Self::Eager),
            "EXTRA_LAZY" => Ok(Self::ExtraLazy),
            mode => Err(Error::mapping(MappingError::InvalidFetchMode {
                class_name: class_name.to_string(),
                mode: mode.to_string(),
            })),
        }
    }
}

/// How a class hierarchy is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InheritanceType {
    /// No inheritance mapping.
    #[default]
    None,
    /// One table per class, joined on the identifier.
    Joined,
    /// One table for the whole hierarchy.
    SingleTable,
    /// One complete table per concrete class.
    TablePerClass,
}

impl InheritanceType {
    /// Parses an inheritance type name.
    ///
    /// # Errors
    ///
    /// Fails for unknown names.
    pub fn parse(class_name: &str, value: &str) -> Result<Self> {
        match upper(value).as_str() {
            "NONE" => Ok(Self::None),
            "JOINED" => Ok(Self::Joined),
            "SINGLE_TABLE" => Ok(Self::SingleTable),
            "TABLE_PER_CLASS" => Ok(Self::TablePerClass),
            _ => Err(Error::mapping(MappingError::InvalidInheritanceType {
                class_name: class_name.to_string(),
                value: value.to_string(),
            })),
        }
    }
}

/// How changes to managed entities are detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeTrackingPolicy {
    /// Every managed entity is compared on flush.
    DeferredImplicit,
    /// Only entities explicitly persisted are compared.
    #[default]
    DeferredExplicit,
    /// Entities notify about their changes.
    Notify,
}

impl ChangeTrackingPolicy {
    /// Parses a change tracking policy name.
    ///
    /// # Errors
    ///
    /// Fails for unknown names.
    pub fn parse(class_name: &str, value: &str) -> Result<Self> {
        match upper(value).as_str() {
            "DEFERRED_IMPLICIT" => Ok(Self::DeferredImplicit),
            "DEFERRED_EXPLICIT" => Ok(Self::DeferredExplicit),
            "NOTIFY" => Ok(Self::Notify),
            _ => Err(Error::mapping(MappingError::InvalidChangeTrackingPolicy {
                class_name: class_name.to_string(),
                value: value.to_string(),
            })),
        }
    }
}

/// Identifier generation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorType {
    /// Chosen by the platform.
    Auto,
    /// A database sequence.
    Sequence,
    /// A generator table.
    Table,
    /// An identity/auto-increment column.
    Identity,
    /// Assigned by the application.
    #[default]
    None,
    /// A UUID.
    Uuid,
    /// A custom generator class.
    Custom,
}

impl GeneratorType {
    /// Parses a strategy name.
    ///
    /// # Errors
    ///
    /// Fails for unknown names.
    pub fn parse(class_name: &str, value: &str) -> Result<Self> {
        match upper(value).as_str() {
            "AUTO" => Ok(Self::Auto),
            "SEQUENCE" => Ok(Self::Sequence),
            "TABLE" => Ok(Self::Table),
            "IDENTITY" => Ok(Self::Identity),
            "NONE" => Ok(Self::None),
            "UUID" => Ok(Self::Uuid),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(Error::mapping(MappingError::InvalidGeneratorStrategy {
                class_name: class_name.to_string(),
                value: value.to_string(),
            })),
        }
    }
}

/// Second-level cache usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheUsage {
    /// Cached entries never change.
    #[default]
    ReadOnly,
    /// Updates without locking.
    NonstrictReadWrite,
    /// Updates with locking.
    ReadWrite,
}

impl CacheUsage {
    /// Parses a cache usage name.
    ///
    /// # Errors
    ///
    /// Fails for unknown names.
    pub fn parse(class_name: &str, value: &str) -> Result<Self> {
        match upper(value).as_str() {
            "READ_ONLY" => Ok(Self::ReadOnly),
            "NONSTRICT_READ_WRITE" => Ok(Self::NonstrictReadWrite),
            "READ_WRITE" => Ok(Self::ReadWrite),
            _ => Err(Error::mapping(MappingError::InvalidMapping {
                class_name: class_name.to_string(),
                message: format!("unknown cache usage \"{value}\""),
            })),
        }
    }
}

/// Second-level cache settings of a class or association.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Usage mode.
    pub usage: CacheUsage,
    /// Cache region.
    pub region: Option<String>,
}

/// The four association kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Single-valued, unique on both sides.
    OneToOne,
    /// Collection on the inverse side of a many-to-one.
    OneToMany,
    /// Single-valued reference shared by many owners.
    ManyToOne,
    /// Collection through a join table.
    ManyToMany,
}

impl AssociationKind {
    /// Single-valued associations.
    #[must_use]
    pub fn is_to_one(self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToOne)
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToOne => write!(f, "OneToOne"),
            Self::OneToMany => write!(f, "OneToMany"),
            Self::ManyToOne => write!(f, "ManyToOne"),
            Self::ManyToMany => write!(f, "ManyToMany"),
        }
    }
}

/// A foreign key column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumn {
    /// Column name.
    pub name: Option<String>,
    /// Column on the referenced table.
    pub referenced_column_name: Option<String>,
    /// Unique constraint.
    pub unique: bool,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// ON DELETE action.
    pub on_delete: Option<String>,
    /// Raw column definition.
    pub column_definition: Option<String>,
}

impl JoinColumn {
    /// A join column whose names are still to be derived.
    #[must_use]
    pub fn unresolved(name: Option<String>) -> Self {
        Self {
            name,
            nullable: true,
            ..Self::default()
        }
    }

    /// Converts an annotation; a missing name falls back to `default_name`.
    #[must_use]
    pub fn from_annotation(annotation: &JoinColumnAnnotation, default_name: Option<&str>) -> Self {
        Self {
            name: annotation
                .name
                .clone()
                .or_else(|| default_name.map(str::to_string)),
            referenced_column_name: annotation.referenced_column_name.clone(),
            unique: annotation.unique,
            nullable: annotation.nullable,
            on_delete: annotation.on_delete.clone(),
            column_definition: annotation.column_definition.clone(),
        }
    }

    /// True while the referenced column still has to be looked up.
    #[must_use]
    pub fn needs_referenced_column(&self) -> bool {
        self.referenced_column_name
            .as_deref()
            .is_none_or(|c| c == "id")
    }
}

/// A join table of a many-to-many association.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTable {
    /// Table name.
    pub name: String,
    /// Schema name.
    pub schema: Option<String>,
    /// Columns pointing at the owning side.
    pub join_columns: Vec<JoinColumn>,
    /// Columns pointing at the target side.
    pub inverse_join_columns: Vec<JoinColumn>,
}

impl JoinTable {
    /// Converts an annotation as written, without deriving missing names.
    #[must_use]
    pub fn from_annotation(annotation: &JoinTableAnnotation) -> Self {
        Self {
            name: annotation.name.clone().unwrap_or_default(),
            schema: annotation.schema.clone(),
            join_columns: annotation
                .join_columns
                .iter()
                .map(|c| JoinColumn::from_annotation(c, None))
                .collect(),
            inverse_join_columns: annotation
                .inverse_join_columns
                .iter()
                .map(|c| JoinColumn::from_annotation(c, None))
                .collect(),
        }
    }
}

/// A property mapped to a column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Property name.
    pub field_name: String,
    /// Column name.
    pub column_name: String,
    /// Column type; `None` keeps the platform default (string).
    pub field_type: Option<String>,
    /// Column length.
    pub length: Option<u32>,
    /// Decimal precision.
    pub precision: u32,
    /// Decimal scale.
    pub scale: u32,
    /// Unique constraint.
    pub unique: bool,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Platform options.
    pub options: BTreeMap<String, String>,
    /// Raw column definition.
    pub column_definition: Option<String>,
    /// Part of the identifier.
    pub id: bool,
    /// Class the mapping was inherited from.
    pub inherited: Option<String>,
}

impl FieldMapping {
    /// A non-nullable field whose column is the lowercased property name.
    #[must_use]
    pub fn new(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            column_name: field_name.to_lowercase(),
            ..Self::default()
        }
    }

    /// Applies a column annotation. An explicit `string` type leaves the
    /// type unset.
    pub fn apply_column(&mut self, column: &ColumnAnnotation) {
        self.field_type = (column.column_type != "string").then(|| column.column_type.clone());
        self.scale = column.scale;
        self.length = column.length;
        self.unique = column.unique;
        self.nullable = column.nullable;
        self.precision = column.precision;
        self.options.clone_from(&column.options);
        if let Some(name) = &column.name {
            self.column_name.clone_from(name);
        }
        if column.column_definition.is_some() {
            self.column_definition.clone_from(&column.column_definition);
        }
    }
}

/// A property mapped as an association.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationMapping {
    /// Property name.
    pub field_name: String,
    /// Association kind.
    pub kind: AssociationKind,
    /// Target entity class.
    pub target_entity: String,
    /// Owning-side field on the target (set on the inverse side).
    pub mapped_by: Option<String>,
    /// Inverse-side field on the target (set on the owning side).
    pub inversed_by: Option<String>,
    /// Foreign key columns of to-one owning sides.
    pub join_columns: Vec<JoinColumn>,
    /// Join table of many-to-many owning sides.
    pub join_table: Option<JoinTable>,
    /// Cascaded operations.
    pub cascade: Vec<String>,
    /// Fetch mode.
    pub fetch: FetchMode,
    /// Whether removed elements are deleted.
    pub orphan_removal: bool,
    /// Field the collection is indexed by.
    pub index_by: Option<String>,
    /// Collection ordering, field to direction.
    pub order_by: BTreeMap<String, String>,
    /// Part of the identifier.
    pub id: bool,
    /// Class the mapping was inherited from.
    pub inherited: Option<String>,
}

impl AssociationMapping {
    /// An association with defaults for everything but name, kind and target.
    #[must_use]
    pub fn new(field_name: &str, kind: AssociationKind, target_entity: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            kind,
            target_entity: target_entity.to_string(),
            mapped_by: None,
            inversed_by: None,
            join_columns: Vec::new(),
            join_table: None,
            cascade: Vec::new(),
            fetch: FetchMode::Lazy,
            orphan_removal: false,
            index_by: None,
            order_by: BTreeMap::new(),
            id: false,
            inherited: None,
        }
    }

    /// The owning side holds the foreign key or join table.
    #[must_use]
    pub fn is_owning_side(&self) -> bool {
        self.mapped_by.is_none()
    }
}

/// A value object embedded into the owner's table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMapping {
    /// Property name.
    pub field_name: String,
    /// Embedded class.
    pub class: String,
    /// Prefix of the embedded columns.
    pub column_prefix: Option<String>,
    /// Class the mapping was inherited from.
    pub inherited: Option<String>,
}

/// An index or unique constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIndex {
    /// Index name, if given.
    pub name: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Index flags.
    pub flags: Vec<String>,
    /// Platform options.
    pub options: BTreeMap<String, String>,
}

/// The primary table of a class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,
    /// Schema name.
    pub schema: Option<String>,
    /// Indexes.
    pub indexes: Vec<TableIndex>,
    /// Unique constraints.
    pub unique_constraints: Vec<TableIndex>,
    /// Platform options.
    pub options: BTreeMap<String, String>,
}

/// Column holding the discriminator value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminatorColumn {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: String,
    /// Column length.
    pub length: u32,
    /// Raw column definition.
    pub column_definition: Option<String>,
}

impl Default for DiscriminatorColumn {
    fn default() -> Self {
        Self {
            name: "dtype".to_string(),
            column_type: "string".to_string(),
            length: 255,
            column_definition: None,
        }
    }
}

/// Sequence generator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceGeneratorDefinition {
    /// Sequence name.
    pub sequence_name: Option<String>,
    /// Allocation size.
    pub allocation_size: u32,
    /// Initial value.
    pub initial_value: u32,
}

/// A named DQL query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    /// Query name.
    pub name: String,
    /// DQL.
    pub query: String,
}

/// A named native SQL query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedNativeQuery {
    /// Query name.
    pub name: String,
    /// SQL.
    pub query: String,
    /// Result class.
    pub result_class: Option<String>,
    /// Result set mapping name.
    pub result_set_mapping: Option<String>,
}

/// Replacement join settings for an inherited association.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationOverride {
    /// Replacement join columns.
    pub join_columns: Vec<JoinColumn>,
    /// Replacement join table.
    pub join_table: Option<JoinTable>,
    /// Replacement inverse side.
    pub inversed_by: Option<String>,
    /// Replacement fetch mode.
    pub fetch: Option<FetchMode>,
}

/// A listener method bound to a lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityListener {
    /// Listener class.
    pub class: String,
    /// Listener method.
    pub method: String,
}

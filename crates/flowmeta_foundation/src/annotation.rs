//! Typed annotations attached to classes, properties and methods.
//!
//! Framework annotations (`Neos\Flow\Annotations\*`) and ORM annotations
//! (`Doctrine\ORM\Mapping\*`) form a closed set. Anything else is kept as
//! [`Annotation::Other`] with its fully qualified name and raw arguments.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const FLOW_NAMESPACE: &str = "Neos\\Flow\\Annotations\\";
const ORM_NAMESPACE: &str = "Doctrine\\ORM\\Mapping\\";

/// ORM lifecycle events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Before the entity is first persisted.
    PrePersist,
    /// After the entity was first persisted.
    PostPersist,
    /// Before an update is flushed.
    PreUpdate,
    /// After an update was flushed.
    PostUpdate,
    /// Before removal.
    PreRemove,
    /// After removal.
    PostRemove,
    /// After the entity was loaded.
    PostLoad,
    /// Before a flush.
    PreFlush,
}

impl LifecycleEvent {
    /// All events in registration order.
    pub const ALL: [Self; 8] = [
        Self::PrePersist,
        Self::PostPersist,
        Self::PreUpdate,
        Self::PostUpdate,
        Self::PreRemove,
        Self::PostRemove,
        Self::PostLoad,
        Self::PreFlush,
    ];

    /// The callback method name used by convention (`prePersist`, ...).
    #[must_use]
    pub fn method_name(self) -> &'static str {
        match self {
            Self::PrePersist => "prePersist",
            Self::PostPersist => "postPersist",
            Self::PreUpdate => "preUpdate",
            Self::PostUpdate => "postUpdate",
            Self::PreRemove => "preRemove",
            Self::PostRemove => "postRemove",
            Self::PostLoad => "postLoad",
            Self::PreFlush => "preFlush",
        }
    }

    fn annotation_name(self) -> &'static str {
        match self {
            Self::PrePersist => "PrePersist",
            Self::PostPersist => "PostPersist",
            Self::PreUpdate => "PreUpdate",
            Self::PostUpdate => "PostUpdate",
            Self::PreRemove => "PreRemove",
            Self::PostRemove => "PostRemove",
            Self::PostLoad => "PostLoad",
            Self::PreFlush => "PreFlush",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method_name())
    }
}

/// Discriminant of an [`Annotation`], used as index key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// `Flow\Entity`
    Entity,
    /// `Flow\ValueObject`
    ValueObject,
    /// `Flow\Lazy`
    Lazy,
    /// `Flow\Transient`
    Transient,
    /// `Flow\Identity`
    Identity,
    /// `Flow\Inject`
    Inject,
    /// `Flow\InjectConfiguration`
    InjectConfiguration,
    /// `Flow\Scope`
    Scope,
    /// `Flow\Proxy`
    Proxy,
    /// `ORM\Entity`
    OrmEntity,
    /// `ORM\MappedSuperclass`
    MappedSuperclass,
    /// `ORM\Embeddable`
    Embeddable,
    /// `ORM\Table`
    Table,
    /// `ORM\Column`
    Column,
    /// `ORM\Id`
    Id,
    /// `ORM\GeneratedValue`
    GeneratedValue,
    /// `ORM\Version`
    Version,
    /// `ORM\SequenceGenerator`
    SequenceGenerator,
    /// `ORM\TableGenerator`
    TableGenerator,
    /// `ORM\CustomIdGenerator`
    CustomIdGenerator,
    /// `ORM\OneToOne`
    OneToOne,
    /// `ORM\OneToMany`
    OneToMany,
    /// `ORM\ManyToOne`
    ManyToOne,
    /// `ORM\ManyToMany`
    ManyToMany,
    /// `ORM\JoinColumn`
    JoinColumn,
    /// `ORM\JoinColumns`
    JoinColumns,
    /// `ORM\JoinTable`
    JoinTable,
    /// `ORM\OrderBy`
    OrderBy,
    /// `ORM\Embedded`
    Embedded,
    /// `ORM\InheritanceType`
    InheritanceType,
    /// `ORM\DiscriminatorColumn`
    DiscriminatorColumn,
    /// `ORM\DiscriminatorMap`
    DiscriminatorMap,
    /// `ORM\ChangeTrackingPolicy`
    ChangeTrackingPolicy,
    /// `ORM\Cache`
    Cache,
    /// `ORM\NamedQueries`
    NamedQueries,
    /// `ORM\NamedNativeQueries`
    NamedNativeQueries,
    /// `ORM\AssociationOverrides`
    AssociationOverrides,
    /// `ORM\AttributeOverrides`
    AttributeOverrides,
    /// `ORM\EntityListeners`
    EntityListeners,
    /// `ORM\HasLifecycleCallbacks`
    HasLifecycleCallbacks,
    /// One of the `ORM\Pre*` / `ORM\Post*` callback markers.
    Lifecycle(LifecycleEvent),
    /// Any other annotation, by fully qualified name.
    Other(String),
}

impl AnnotationKind {
    /// The fully qualified annotation class name.
    #[must_use]
    pub fn name(&self) -> String {
        let (namespace, short) = match self {
            Self::Entity => (FLOW_NAMESPACE, "Entity"),
            Self::ValueObject => (FLOW_NAMESPACE, "ValueObject"),
            Self::Lazy => (FLOW_NAMESPACE, "Lazy"),
            Self::Transient => (FLOW_NAMESPACE, "Transient"),
            Self::Identity => (FLOW_NAMESPACE, "Identity"),
            Self::Inject => (FLOW_NAMESPACE, "Inject"),
            Self::InjectConfiguration => (FLOW_NAMESPACE, "InjectConfiguration"),
            Self::Scope => (FLOW_NAMESPACE, "Scope"),
            Self::Proxy => (FLOW_NAMESPACE, "Proxy"),
            Self::OrmEntity => (ORM_NAMESPACE, "Entity"),
            Self::MappedSuperclass => (ORM_NAMESPACE, "MappedSuperclass"),
            Self::Embeddable => (ORM_NAMESPACE, "Embeddable"),
            Self::Table => (ORM_NAMESPACE, "Table"),
            Self::Column => (ORM_NAMESPACE, "Column"),
            Self::Id => (ORM_NAMESPACE, "Id"),
            Self::GeneratedValue => (ORM_NAMESPACE, "GeneratedValue"),
            Self::Version => (ORM_NAMESPACE, "Version"),
            Self::SequenceGenerator => (ORM_NAMESPACE, "SequenceGenerator"),
            Self::TableGenerator => (ORM_NAMESPACE, "TableGenerator"),
            Self::CustomIdGenerator => (ORM_NAMESPACE, "CustomIdGenerator"),
            Self::OneToOne => (ORM_NAMESPACE, "OneToOne"),
            Self::OneToMany => (ORM_NAMESPACE, "OneToMany"),
            Self::ManyToOne => (ORM_NAMESPACE, "ManyToOne"),
            Self::ManyToMany => (ORM_NAMESPACE, "ManyToMany"),
            Self::JoinColumn => (ORM_NAMESPACE, "JoinColumn"),
            Self::JoinColumns => (ORM_NAMESPACE, "JoinColumns"),
            Self::JoinTable => (ORM_NAMESPACE, "JoinTable"),
            Self::OrderBy => (ORM_NAMESPACE, "OrderBy"),
            Self::Embedded => (ORM_NAMESPACE, "Embedded"),
            Self::InheritanceType => (ORM_NAMESPACE, "InheritanceType"),
            Self::DiscriminatorColumn => (ORM_NAMESPACE, "DiscriminatorColumn"),
            Self::DiscriminatorMap => (ORM_NAMESPACE, "DiscriminatorMap"),
            Self::ChangeTrackingPolicy => (ORM_NAMESPACE, "ChangeTrackingPolicy"),
            Self::Cache => (ORM_NAMESPACE, "Cache"),
            Self::NamedQueries => (ORM_NAMESPACE, "NamedQueries"),
            Self::NamedNativeQueries => (ORM_NAMESPACE, "NamedNativeQueries"),
            Self::AssociationOverrides => (ORM_NAMESPACE, "AssociationOverrides"),
            Self::AttributeOverrides => (ORM_NAMESPACE, "AttributeOverrides"),
            Self::EntityListeners => (ORM_NAMESPACE, "EntityListeners"),
            Self::HasLifecycleCallbacks => (ORM_NAMESPACE, "HasLifecycleCallbacks"),
            Self::Lifecycle(event) => (ORM_NAMESPACE, event.annotation_name()),
            Self::Other(name) => return name.clone(),
        };
        format!("{namespace}{short}")
    }

    /// Resolves a fully qualified annotation class name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.strip_prefix('\\').unwrap_or(name);
        if let Some(short) = name.strip_prefix(FLOW_NAMESPACE) {
            return match short {
                "Entity" => Self::Entity,
                "ValueObject" => Self::ValueObject,
                "Lazy" => Self::Lazy,
                "Transient" => Self::Transient,
                "Identity" => Self::Identity,
                "Inject" => Self::Inject,
                "InjectConfiguration" => Self::InjectConfiguration,
                "Scope" => Self::Scope,
                "Proxy" => Self::Proxy,
                _ => Self::Other(name.to_string()),
            };
        }
        if let Some(short) = name.strip_prefix(ORM_NAMESPACE) {
            if let Some(event) = LifecycleEvent::ALL
                .iter()
                .find(|event| event.annotation_name() == short)
            {
                return Self::Lifecycle(*event);
            }
            return match short {
                "Entity" => Self::OrmEntity,
                "MappedSuperclass" => Self::MappedSuperclass,
                "Embeddable" => Self::Embeddable,
                "Table" => Self::Table,
                "Column" => Self::Column,
                "Id" => Self::Id,
                "GeneratedValue" => Self::GeneratedValue,
                "Version" => Self::Version,
                "SequenceGenerator" => Self::SequenceGenerator,
                "TableGenerator" => Self::TableGenerator,
                "CustomIdGenerator" => Self::CustomIdGenerator,
                "OneToOne" => Self::OneToOne,
                "OneToMany" => Self::OneToMany,
                "ManyToOne" => Self::ManyToOne,
                "ManyToMany" => Self::ManyToMany,
                "JoinColumn" => Self::JoinColumn,
                "JoinColumns" => Self::JoinColumns,
                "JoinTable" => Self::JoinTable,
                "OrderBy" => Self::OrderBy,
                "Embedded" => Self::Embedded,
                "InheritanceType" => Self::InheritanceType,
                "DiscriminatorColumn" => Self::DiscriminatorColumn,
                "DiscriminatorMap" => Self::DiscriminatorMap,
                "ChangeTrackingPolicy" => Self::ChangeTrackingPolicy,
                "Cache" => Self::Cache,
                "NamedQueries" => Self::NamedQueries,
                "NamedNativeQueries" => Self::NamedNativeQueries,
                "AssociationOverrides" => Self::AssociationOverrides,
                "AttributeOverrides" => Self::AttributeOverrides,
                "EntityListeners" => Self::EntityListeners,
                "HasLifecycleCallbacks" => Self::HasLifecycleCallbacks,
                _ => Self::Other(name.to_string()),
            };
        }
        Self::Other(name.to_string())
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Arguments of `Flow\Entity` and `ORM\Entity`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    /// Custom repository class.
    pub repository_class: Option<String>,
    /// Whether instances are read-only.
    pub read_only: bool,
}

/// Arguments of `ORM\Column`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAnnotation {
    /// Column name.
    pub name: Option<String>,
    /// Column type; defaults to `string`.
    pub column_type: String,
    /// Column length.
    pub length: Option<u32>,
    /// Decimal precision.
    pub precision: u32,
    /// Decimal scale.
    pub scale: u32,
    /// Unique constraint on this column.
    pub unique: bool,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Platform options.
    pub options: BTreeMap<String, String>,
    /// Raw column definition.
    pub column_definition: Option<String>,
}

impl Default for ColumnAnnotation {
    fn default() -> Self {
        Self {
            name: None,
            column_type: "string".to_string(),
            length: None,
            precision: 0,
            scale: 0,
            unique: false,
            nullable: false,
            options: BTreeMap::new(),
            column_definition: None,
        }
    }
}

/// Arguments of `ORM\JoinColumn`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumnAnnotation {
    /// Column name.
    pub name: Option<String>,
    /// Referenced column; defaults to `id`.
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

impl Default for JoinColumnAnnotation {
    fn default() -> Self {
        Self {
            name: None,
            referenced_column_name: Some("id".to_string()),
            unique: false,
            nullable: true,
            on_delete: None,
            column_definition: None,
        }
    }
}

/// Arguments of `ORM\JoinTable`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTableAnnotation {
    /// Table name.
    pub name: Option<String>,
    /// Schema name.
    pub schema: Option<String>,
    /// Columns pointing at the owning side.
    pub join_columns: Vec<JoinColumnAnnotation>,
    /// Columns pointing at the target side.
    pub inverse_join_columns: Vec<JoinColumnAnnotation>,
}

/// Arguments shared by the four association annotations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationAnnotation {
    /// Target entity class.
    pub target_entity: Option<String>,
    /// Owning-side field on the target.
    pub mapped_by: Option<String>,
    /// Inverse-side field on the target.
    pub inversed_by: Option<String>,
    /// Cascade operations (`persist`, `remove`, `all`, ...).
    pub cascade: Vec<String>,
    /// Fetch mode name; defaults to `LAZY`.
    pub fetch: String,
    /// Whether orphans are removed.
    pub orphan_removal: bool,
    /// Index the collection by this field.
    pub index_by: Option<String>,
}

impl Default for AssociationAnnotation {
    fn default() -> Self {
        Self {
            target_entity: None,
            mapped_by: None,
            inversed_by: None,
            cascade: Vec::new(),
            fetch: "LAZY".to_string(),
            orphan_removal: false,
            index_by: None,
        }
    }
}

/// An index declared on a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAnnotation {
    /// Index name.
    pub name: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Index flags.
    pub flags: Vec<String>,
    /// Platform options.
    pub options: BTreeMap<String, String>,
}

/// Arguments of `ORM\Table`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAnnotation {
    /// Table name.
    pub name: Option<String>,
    /// Schema name.
    pub schema: Option<String>,
    /// Indexes.
    pub indexes: Vec<IndexAnnotation>,
    /// Unique constraints.
    pub unique_constraints: Vec<IndexAnnotation>,
    /// Platform options.
    pub options: BTreeMap<String, String>,
}

/// Arguments of `ORM\DiscriminatorColumn`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminatorColumnAnnotation {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: String,
    /// Column length.
    pub length: u32,
    /// Raw column definition.
    pub column_definition: Option<String>,
}

impl Default for DiscriminatorColumnAnnotation {
    fn default() -> Self {
        Self {
            name: "dtype".to_string(),
            column_type: "string".to_string(),
            length: 255,
            column_definition: None,
        }
    }
}

/// Arguments of `ORM\SequenceGenerator`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceGeneratorAnnotation {
    /// Sequence name.
    pub sequence_name: Option<String>,
    /// Allocation size.
    pub allocation_size: u32,
    /// Initial value.
    pub initial_value: u32,
}

impl Default for SequenceGeneratorAnnotation {
    fn default() -> Self {
        Self {
            sequence_name: None,
            allocation_size: 1,
            initial_value: 1,
        }
    }
}

/// Arguments of `ORM\Cache`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheAnnotation {
    /// Usage name; defaults to `READ_ONLY`.
    pub usage: String,
    /// Cache region.
    pub region: Option<String>,
}

impl Default for CacheAnnotation {
    fn default() -> Self {
        Self {
            usage: "READ_ONLY".to_string(),
            region: None,
        }
    }
}

/// One named DQL query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQueryAnnotation {
    /// Query name.
    pub name: String,
    /// DQL.
    pub query: String,
}

/// One named native SQL query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedNativeQueryAnnotation {
    /// Query name.
    pub name: String,
    /// SQL.
    pub query: String,
    /// Result class.
    pub result_class: Option<String>,
    /// Result set mapping name.
    pub result_set_mapping: Option<String>,
}

/// Override of an inherited association.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationOverrideAnnotation {
    /// Overridden field.
    pub name: String,
    /// Replacement join columns.
    pub join_columns: Vec<JoinColumnAnnotation>,
    /// Replacement join table.
    pub join_table: Option<JoinTableAnnotation>,
    /// Replacement inversed-by.
    pub inversed_by: Option<String>,
    /// Replacement fetch mode.
    pub fetch: Option<String>,
}

/// Override of an inherited column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOverrideAnnotation {
    /// Overridden field.
    pub name: String,
    /// Replacement column.
    pub column: ColumnAnnotation,
}

/// An annotation with its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// `Flow\Entity`
    Entity(EntityAnnotation),
    /// `Flow\ValueObject`; `embedded` maps it as ORM embeddable.
    ValueObject {
        /// Map as embedded value.
        embedded: bool,
    },
    /// `Flow\Lazy`
    Lazy,
    /// `Flow\Transient`
    Transient,
    /// `Flow\Identity`
    Identity,
    /// `Flow\Inject`
    Inject,
    /// `Flow\InjectConfiguration`
    InjectConfiguration,
    /// `Flow\Scope("singleton")`
    Scope(String),
    /// `Flow\Proxy`
    Proxy {
        /// Whether a proxy is built.
        enabled: bool,
    },
    /// `ORM\Entity`
    OrmEntity(EntityAnnotation),
    /// `ORM\MappedSuperclass`
    MappedSuperclass {
        /// Custom repository class.
        repository_class: Option<String>,
    },
    /// `ORM\Embeddable`
    Embeddable,
    /// `ORM\Table`
    Table(TableAnnotation),
    /// `ORM\Column`
    Column(ColumnAnnotation),
    /// `ORM\Id`
    Id,
    /// `ORM\GeneratedValue`
    GeneratedValue {
        /// Strategy name; `AUTO` when unspecified.
        strategy: String,
    },
    /// `ORM\Version`
    Version,
    /// `ORM\SequenceGenerator`
    SequenceGenerator(SequenceGeneratorAnnotation),
    /// `ORM\TableGenerator`
    TableGenerator,
    /// `ORM\CustomIdGenerator`
    CustomIdGenerator {
        /// Generator class.
        class: Option<String>,
    },
    /// `ORM\OneToOne`
    OneToOne(AssociationAnnotation),
    /// `ORM\OneToMany`
    OneToMany(AssociationAnnotation),
    /// `ORM\ManyToOne`
    ManyToOne(AssociationAnnotation),
    /// `ORM\ManyToMany`
    ManyToMany(AssociationAnnotation),
    /// `ORM\JoinColumn`
    JoinColumn(JoinColumnAnnotation),
    /// `ORM\JoinColumns`
    JoinColumns(Vec<JoinColumnAnnotation>),
    /// `ORM\JoinTable`
    JoinTable(JoinTableAnnotation),
    /// `ORM\OrderBy`, field to direction.
    OrderBy(BTreeMap<String, String>),
    /// `ORM\Embedded`
    Embedded {
        /// Embedded class.
        class: Option<String>,
        /// Column prefix.
        column_prefix: Option<String>,
    },
    /// `ORM\InheritanceType("SINGLE_TABLE")`
    InheritanceType(String),
    /// `ORM\DiscriminatorColumn`
    DiscriminatorColumn(DiscriminatorColumnAnnotation),
    /// `ORM\DiscriminatorMap`, discriminator value to class.
    DiscriminatorMap(BTreeMap<String, String>),
    /// `ORM\ChangeTrackingPolicy("DEFERRED_IMPLICIT")`
    ChangeTrackingPolicy(String),
    /// `ORM\Cache`
    Cache(CacheAnnotation),
    /// `ORM\NamedQueries`
    NamedQueries(Vec<NamedQueryAnnotation>),
    /// `ORM\NamedNativeQueries`
    NamedNativeQueries(Vec<NamedNativeQueryAnnotation>),
    /// `ORM\AssociationOverrides`
    AssociationOverrides(Vec<AssociationOverrideAnnotation>),
    /// `ORM\AttributeOverrides`
    AttributeOverrides(Vec<AttributeOverrideAnnotation>),
    /// `ORM\EntityListeners`
    EntityListeners(Vec<String>),
    /// `ORM\HasLifecycleCallbacks`
    HasLifecycleCallbacks,
    /// A lifecycle callback marker on a method.
    Lifecycle(LifecycleEvent),
    /// Any other annotation.
    Other {
        /// Fully qualified annotation class name.
        name: String,
        /// Raw arguments.
        arguments: BTreeMap<String, String>,
    },
}

impl Annotation {
    /// Creates an annotation of a foreign type without arguments.
    #[must_use]
    pub fn other(name: impl Into<String>) -> Self {
        Self::Other {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// The discriminant of this annotation.
    #[must_use]
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Entity(_) => AnnotationKind::Entity,
            Self::ValueObject { .. } => AnnotationKind::ValueObject,
            Self::Lazy => AnnotationKind::Lazy,
            Self::Transient => AnnotationKind::Transient,
            Self::Identity => AnnotationKind::Identity,
            Self::Inject => AnnotationKind::Inject,
            Self::InjectConfiguration => AnnotationKind::InjectConfiguration,
            Self::Scope(_) => AnnotationKind::Scope,
            Self::Proxy { .. } => AnnotationKind::Proxy,
            Self::OrmEntity(_) => AnnotationKind::OrmEntity,
            Self::MappedSuperclass { .. } => AnnotationKind::MappedSuperclass,
            Self::Embeddable => AnnotationKind::Embeddable,
            Self::Table(_) => AnnotationKind::Table,
            Self::Column(_) => AnnotationKind::Column,
            Self::Id => AnnotationKind::Id,
            Self::GeneratedValue { .. } => AnnotationKind::GeneratedValue,
            Self::Version => AnnotationKind::Version,
            Self::SequenceGenerator(_) => AnnotationKind::SequenceGenerator,
            Self::TableGenerator => AnnotationKind::TableGenerator,
            Self::CustomIdGenerator { .. } => AnnotationKind::CustomIdGenerator,
            Self::OneToOne(_) => AnnotationKind::OneToOne,
            Self::OneToMany(_) => AnnotationKind::OneToMany,
            Self::ManyToOne(_) => AnnotationKind::ManyToOne,
            Self::ManyToMany(_) => AnnotationKind::ManyToMany,
            Self::JoinColumn(_) => AnnotationKind::JoinColumn,
            Self::JoinColumns(_) => AnnotationKind::JoinColumns,
            Self::JoinTable(_) => AnnotationKind::JoinTable,
            Self::OrderBy(_) => AnnotationKind::OrderBy,
            Self::Embedded { .. } => AnnotationKind::Embedded,
            Self::InheritanceType(_) => AnnotationKind::InheritanceType,
            Self::DiscriminatorColumn(_) => AnnotationKind::DiscriminatorColumn,
            Self::DiscriminatorMap(_) => AnnotationKind::DiscriminatorMap,
            Self::ChangeTrackingPolicy(_) => AnnotationKind::ChangeTrackingPolicy,
            Self::Cache(_) => AnnotationKind::Cache,
            Self::NamedQueries(_) => AnnotationKind::NamedQueries,
            Self::NamedNativeQueries(_) => AnnotationKind::NamedNativeQueries,
            Self::AssociationOverrides(_) => AnnotationKind::AssociationOverrides,
            Self::AttributeOverrides(_) => AnnotationKind::AttributeOverrides,
            Self::EntityListeners(_) => AnnotationKind::EntityListeners,
            Self::HasLifecycleCallbacks => AnnotationKind::HasLifecycleCallbacks,
            Self::Lifecycle(event) => AnnotationKind::Lifecycle(*event),
            Self::Other { name, .. } => AnnotationKind::Other(name.clone()),
        }
    }
}

//! Loading, refreshing and persisting reflection data.
//!
//! A build pass initializes the service from the caches, forgets classes
//! whose sources changed, reflects the classes that emerged since the last
//! pass and builds their schemata. Saving writes the compiletime blob and,
//! in production, the per-class runtime entries, which are then frozen.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use flowmeta_foundation::names::is_in_namespace;
use flowmeta_foundation::{
    Annotation, AnnotationKind, ApplicationContext, Error, ErrorKind, Result, cache_identifier,
    clean_class_name,
};
use im::{OrdMap, OrdSet};
use tracing::{debug, info, warn};

use crate::cache::{ReflectionCaches, decode, encode, io_error};
use crate::record::ClassRecord;
use crate::schema::ClassSchema;
use crate::service::{ReflectionData, ReflectionService};

const REFLECTION_DATA_ENTRY: &str = "ReflectionData";
const AVAILABLE_CLASS_NAMES_ENTRY: &str = "__availableClassNames";
const CLASS_NAMES_ENTRY: &str = "__classNames";
const ANNOTATED_CLASSES_ENTRY: &str = "__annotatedClasses";
const METHOD_ANNOTATIONS_ENTRY: &str = "__classesByMethodAnnotations";

impl ReflectionService {
    /// Loads reflection data from the caches, once.
    ///
    /// In production with a frozen runtime cache, the runtime entries are
    /// loaded and the service is frozen. Otherwise the compiletime blob is
    /// loaded; in development, precompiled blobs of frozen packages fill in
    /// when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache entry cannot be read or decoded.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        let Some(caches) = self.caches.clone() else {
            return Ok(());
        };

        if self.context.is_production() && caches.runtime.is_frozen() {
            self.load_from_runtime_cache(&caches)?;
            self.frozen = true;
            return Ok(());
        }

        if let Some(bytes) = caches.compiletime.get(AVAILABLE_CLASS_NAMES_ENTRY)? {
            self.available_class_names = decode(&bytes)?;
        }
        match caches.compiletime.get(REFLECTION_DATA_ENTRY)? {
            Some(bytes) => self.data = decode(&bytes)?,
            None if self.context == ApplicationContext::Development => {
                self.load_precompiled_reflection_data()?;
            }
            None => {}
        }
        Ok(())
    }

    fn load_from_runtime_cache(&mut self, caches: &ReflectionCaches) -> Result<()> {
        let class_names: Vec<String> = match caches.runtime.get(CLASS_NAMES_ENTRY)? {
            Some(bytes) => decode(&bytes)?,
            None => Vec::new(),
        };
        let mut data = ReflectionData::default();
        for class_name in class_names {
            let identifier = cache_identifier(&class_name);
            if let Some(bytes) = caches.runtime.get(&identifier)? {
                let record: ClassRecord = decode(&bytes)?;
                data.classes.insert(class_name.clone(), record);
            }
            if let Some(bytes) = caches.schemata.get(&identifier)? {
                let schema: ClassSchema = decode(&bytes)?;
                data.class_schemata.insert(class_name, schema);
            }
        }
        if let Some(bytes) = caches.runtime.get(ANNOTATED_CLASSES_ENTRY)? {
            data.annotated_classes = decode(&bytes)?;
        }
        if let Some(bytes) = caches.runtime.get(METHOD_ANNOTATIONS_ENTRY)? {
            data.classes_by_method_annotations = decode(&bytes)?;
        }
        debug!("Loaded {} classes from the runtime cache", data.classes.len());
        self.data = data;
        Ok(())
    }

    fn load_precompiled_reflection_data(&mut self) -> Result<()> {
        let Some(packages) = self.packages.clone() else {
            return Ok(());
        };
        for package_key in packages.frozen_package_keys() {
            let path = packages.precompiled_reflection_path(&package_key);
            if !path.is_file() {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| io_error("read", &path, &e))?;
            let data: ReflectionData = decode(&bytes)?;
            debug!(
                "Loaded precompiled reflection data of package {package_key} ({} classes)",
                data.classes.len()
            );
            self.data.merge(data);
        }
        Ok(())
    }

    /// Brings reflection data up to date with the available classes.
    ///
    /// `available_class_names` maps package keys to the classes they provide.
    /// Does nothing more than initializing when the data is frozen.
    ///
    /// # Errors
    ///
    /// Fails on cache errors, classes violating the scope rule and schema
    /// construction errors. Classes that cannot be loaded are skipped.
    pub fn build_reflection_data(
        &mut self,
        available_class_names: BTreeMap<String, Vec<String>>,
    ) -> Result<()> {
        self.initialize()?;
        if self.frozen {
            return Ok(());
        }
        self.available_class_names = available_class_names
            .into_iter()
            .map(|(package, classes)| {
                let classes = classes
                    .iter()
                    .map(|c| clean_class_name(c).to_string())
                    .collect();
                (package, classes)
            })
            .collect();
        self.forget_changed_classes();
        self.reflect_emerged_classes()
    }

    /// Reflects available classes that are not reflected yet, then builds
    /// schemata for the entities and value objects among them.
    ///
    /// # Errors
    ///
    /// Fails if an entity or value object is not of scope prototype, or if
    /// schema construction fails.
    pub fn reflect_emerged_classes(&mut self) -> Result<()> {
        let emerged: Vec<String> = self
            .available_class_names
            .values()
            .flatten()
            .filter(|c| !self.data.classes.contains_key(c.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if emerged.is_empty() {
            return Ok(());
        }

        let mut reflected = Vec::with_capacity(emerged.len());
        for class_name in &emerged {
            match self.reflect_class(class_name) {
                Ok(()) => reflected.push(class_name.clone()),
                Err(e) if e.is_class_loading_failure() => {
                    warn!("Skipping class {class_name} during reflection: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let mut schema_candidates = Vec::new();
        for class_name in &reflected {
            let persistable = [
                AnnotationKind::Entity,
                AnnotationKind::OrmEntity,
                AnnotationKind::ValueObject,
            ]
            .iter()
            .any(|kind| self.is_class_annotated_with(class_name, kind));
            if !persistable {
                continue;
            }
            if let Some(Annotation::Scope(scope)) =
                self.get_class_annotation(class_name, &AnnotationKind::Scope)
            {
                if scope != "prototype" {
                    return Err(Error::new(ErrorKind::InvalidScope {
                        class_name: class_name.clone(),
                        scope: scope.clone(),
                    }));
                }
            }
            schema_candidates.push(class_name.clone());
        }
        self.build_class_schemata(&schema_candidates)?;

        info!("Reflected {} emerged classes", reflected.len());
        Ok(())
    }

    /// Reflects a class on demand if it is listed as available but not
    /// reflected yet, together with any other emerged classes. Returns
    /// whether the class is reflected afterwards.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::reflect_emerged_classes`].
    pub fn reflect_if_available(&mut self, class_name: &str) -> Result<bool> {
        self.initialize()?;
        let class_name = clean_class_name(class_name);
        if self.is_class_reflected(class_name) {
            return Ok(true);
        }
        let available = self
            .available_class_names
            .values()
            .any(|classes| classes.iter().any(|c| c == class_name));
        if self.frozen || !available {
            return Ok(false);
        }
        debug!("Reflecting {class_name} on demand");
        self.reflect_emerged_classes()?;
        Ok(self.is_class_reflected(class_name))
    }

    /// Forgets every class whose status entry is missing, except classes of
    /// frozen packages.
    pub fn forget_changed_classes(&mut self) {
        let Some(caches) = self.caches.clone() else {
            return;
        };
        let frozen_namespaces: Vec<String> = self
            .packages
            .as_ref()
            .map(|packages| {
                packages
                    .packages()
                    .into_iter()
                    .filter(|p| packages.is_package_frozen(&p.key))
                    .flat_map(|p| p.namespaces)
                    .collect()
            })
            .unwrap_or_default();

        let changed: Vec<String> = self
            .data
            .classes
            .keys()
            .filter(|c| !frozen_namespaces.iter().any(|ns| is_in_namespace(c, ns)))
            .filter(|c| !caches.status.has(&cache_identifier(c)))
            .cloned()
            .collect();
        for class_name in &changed {
            self.forget_class(class_name);
        }
        if !changed.is_empty() {
            debug!("Forgot {} changed classes", changed.len());
        }
    }

    /// Removes a class and everything derived from it: back-references in
    /// its ancestors and interfaces, annotation indexes, its schema, and
    /// (transitively) its subclasses and implementations.
    pub fn forget_class(&mut self, class_name: &str) {
        let mut pending = vec![clean_class_name(class_name).to_string()];
        let mut visited = BTreeSet::new();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let ancestors = self.get_parent_class_names(&name);
            let Some(record) = self.data.classes.remove(&name) else {
                continue;
            };
            debug!("Forgetting class {name}");

            for ancestor in &ancestors {
                if let Some(parent) = self.data.classes.get_mut(ancestor) {
                    parent.subclasses.remove(&name);
                }
            }
            for interface in &record.interfaces {
                if let Some(interface_record) = self.data.classes.get_mut(interface) {
                    interface_record.implementations.remove(&name);
                }
            }
            self.data.annotated_classes = remove_from_index(&self.data.annotated_classes, &name);
            self.data.classes_by_method_annotations = self
                .data
                .classes_by_method_annotations
                .iter()
                .map(|(kind, by_class)| (kind.clone(), by_class.without(&name)))
                .filter(|(_, by_class)| !by_class.is_empty())
                .collect();
            self.data.class_schemata.remove(&name);
            self.updated_classes.remove(&name);

            for dependent in record.subclasses.iter().chain(&record.implementations) {
                if ancestors.contains(dependent) || *dependent == name {
                    warn!("Cycle in subclass references of {name} via {dependent}, not following it");
                    continue;
                }
                pending.push(dependent.clone());
            }
        }
    }

    /// Writes reflection data to the caches.
    ///
    /// Does nothing when frozen or without caches. In production the
    /// runtime and schema caches are rebuilt and frozen; in development the
    /// reflection of frozen packages without a precompiled blob is frozen.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache entry cannot be encoded or written.
    pub fn save_to_cache(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }
        let Some(caches) = self.caches.clone() else {
            return Ok(());
        };

        caches.compiletime.set(
            AVAILABLE_CLASS_NAMES_ENTRY,
            encode(&self.available_class_names)?,
        )?;
        if !self.updated_classes.is_empty() {
            for class_name in &self.updated_classes {
                caches.status.set(&cache_identifier(class_name), Vec::new())?;
            }
            caches
                .compiletime
                .set(REFLECTION_DATA_ENTRY, encode(&self.data)?)?;
            self.updated_classes.clear();
        }

        match self.context {
            ApplicationContext::Production => self.save_runtime_cache(&caches)?,
            ApplicationContext::Development => {
                if let Some(packages) = self.packages.clone() {
                    for package_key in packages.frozen_package_keys() {
                        if !packages.precompiled_reflection_path(&package_key).is_file() {
                            self.freeze_package_reflection(&package_key)?;
                        }
                    }
                }
            }
            ApplicationContext::Testing => {}
        }
        Ok(())
    }

    fn save_runtime_cache(&self, caches: &ReflectionCaches) -> Result<()> {
        caches.runtime.flush()?;
        caches.schemata.flush()?;

        let class_names: Vec<&String> = self.data.classes.keys().collect();
        for (class_name, record) in &self.data.classes {
            caches
                .runtime
                .set(&cache_identifier(class_name), encode(record)?)?;
        }
        caches.runtime.set(CLASS_NAMES_ENTRY, encode(&class_names)?)?;
        caches
            .runtime
            .set(ANNOTATED_CLASSES_ENTRY, encode(&self.data.annotated_classes)?)?;
        caches.runtime.set(
            METHOD_ANNOTATIONS_ENTRY,
            encode(&self.data.classes_by_method_annotations)?,
        )?;
        for (class_name, schema) in &self.data.class_schemata {
            caches
                .schemata
                .set(&cache_identifier(class_name), encode(schema)?)?;
        }

        caches.runtime.freeze()?;
        caches.schemata.freeze()?;
        info!(
            "Froze runtime reflection cache with {} classes",
            self.data.classes.len()
        );
        Ok(())
    }

    /// Writes the reflection data of one package's classes to its
    /// precompiled blob.
    ///
    /// # Errors
    ///
    /// Fails without a package provider or if the blob cannot be written.
    pub fn freeze_package_reflection(&self, package_key: &str) -> Result<()> {
        let packages = self
            .packages
            .clone()
            .ok_or_else(|| Error::internal("no package provider configured"))?;
        let keep: BTreeSet<String> = self
            .available_class_names
            .get(package_key)
            .map(|classes| classes.iter().cloned().collect())
            .unwrap_or_default();
        let data = self.data.filtered(&keep);

        let directory = packages.precompiled_reflection_directory();
        fs::create_dir_all(directory).map_err(|e| io_error("create directory", directory, &e))?;
        let path = packages.precompiled_reflection_path(package_key);
        fs::write(&path, encode(&data)?).map_err(|e| io_error("write", &path, &e))?;
        debug!(
            "Froze reflection of package {package_key} ({} classes)",
            data.classes.len()
        );
        Ok(())
    }

    /// Deletes a package's precompiled blob, if any.
    ///
    /// # Errors
    ///
    /// Fails without a package provider or if the blob cannot be deleted.
    pub fn unfreeze_package_reflection(&self, package_key: &str) -> Result<()> {
        let packages = self
            .packages
            .clone()
            .ok_or_else(|| Error::internal("no package provider configured"))?;
        let path = packages.precompiled_reflection_path(package_key);
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| io_error("remove", &path, &e))?;
        }
        Ok(())
    }
}

fn remove_from_index(
    index: &OrdMap<AnnotationKind, OrdSet<String>>,
    class_name: &str,
) -> OrdMap<AnnotationKind, OrdSet<String>> {
    index
        .iter()
        .map(|(kind, names)| (kind.clone(), names.without(class_name)))
        .filter(|(_, names)| !names.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flowmeta_foundation::{EntityAnnotation, Settings};

    use super::*;
    use crate::packages::{PackageInfo, PackageProvider, StaticPackages};
    use crate::source::{ClassDefinition, ClassRegistry, PropertyDefinition};

    fn shop_registry() -> ClassRegistry {
        ClassRegistry::new()
            .with(ClassDefinition::interface("Acme\\Shop\\Priced"))
            .with(
                ClassDefinition::class("Acme\\Shop\\Domain\\Model\\Product")
                    .implements("Acme\\Shop\\Priced")
                    .annotate(Annotation::Entity(EntityAnnotation::default()))
                    .property(PropertyDefinition::new("name").typed("string")),
            )
            .with(
                ClassDefinition::class("Acme\\Shop\\Domain\\Model\\Book")
                    .extends("Acme\\Shop\\Domain\\Model\\Product"),
            )
    }

    fn available(classes: &[&str]) -> BTreeMap<String, Vec<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            "Acme.Shop".to_string(),
            classes.iter().map(|c| (*c).to_string()).collect(),
        );
        map
    }

    #[test]
    fn build_reflects_emerged_classes_and_builds_schemata() {
        let mut reflection = ReflectionService::new(shop_registry());
        reflection
            .build_reflection_data(available(&[
                "Acme\\Shop\\Domain\\Model\\Product",
                "Acme\\Shop\\Domain\\Model\\Missing",
            ]))
            .unwrap();

        assert!(reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));
        assert!(reflection.is_class_reflected("Acme\\Shop\\Priced"));
        assert!(!reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Missing"));
        assert!(
            reflection
                .get_class_schema("Acme\\Shop\\Domain\\Model\\Product")
                .is_some()
        );
    }

    #[test]
    fn entities_must_be_prototypes() {
        let registry = ClassRegistry::new().with(
            ClassDefinition::class("Acme\\Shop\\Cart")
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .annotate(Annotation::Scope("singleton".to_string())),
        );
        let mut reflection = ReflectionService::new(registry);
        let err = reflection
            .build_reflection_data(available(&["Acme\\Shop\\Cart"]))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidScope { .. }));
    }

    #[test]
    fn forget_class_cascades_to_subclasses_and_cleans_indexes() {
        let mut reflection = ReflectionService::new(shop_registry());
        reflection
            .reflect_class("Acme\\Shop\\Domain\\Model\\Book")
            .unwrap();
        assert_eq!(
            reflection
                .get_all_implementation_class_names_for_interface("Acme\\Shop\\Priced")
                .unwrap()
                .len(),
            2
        );

        reflection.forget_class("\\Acme\\Shop\\Domain\\Model\\Product");

        assert!(!reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));
        assert!(!reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Book"));
        assert!(reflection.is_class_reflected("Acme\\Shop\\Priced"));
        assert!(
            reflection
                .get_all_implementation_class_names_for_interface("Acme\\Shop\\Priced")
                .unwrap()
                .is_empty()
        );
        assert!(
            reflection
                .get_class_names_by_annotation(&AnnotationKind::Entity)
                .is_empty()
        );
    }

    #[test]
    fn available_classes_are_reflected_on_demand() {
        let mut reflection = ReflectionService::new(shop_registry());
        reflection
            .build_reflection_data(available(&["Acme\\Shop\\Domain\\Model\\Product"]))
            .unwrap();
        reflection.forget_class("Acme\\Shop\\Domain\\Model\\Product");
        assert!(!reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));

        assert!(
            reflection
                .reflect_if_available("\\Acme\\Shop\\Domain\\Model\\Product")
                .unwrap()
        );
        assert!(
            reflection
                .get_class_schema("Acme\\Shop\\Domain\\Model\\Product")
                .is_some()
        );
        assert!(
            !reflection
                .reflect_if_available("Acme\\Shop\\Domain\\Model\\Book")
                .unwrap()
        );
        assert!(!reflection.is_class_reflected("Acme\\Shop\\Domain\\Model\\Book"));
    }

    #[test]
    fn saved_data_is_reused_and_changed_classes_are_forgotten() {
        let caches = ReflectionCaches::in_memory();
        let classes = available(&["Acme\\Shop\\Domain\\Model\\Product"]);

        let mut first = ReflectionService::new(shop_registry()).with_caches(caches.clone());
        first.build_reflection_data(classes.clone()).unwrap();
        first.save_to_cache().unwrap();

        let mut second = ReflectionService::new(shop_registry()).with_caches(caches.clone());
        second.initialize().unwrap();
        assert!(second.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));

        caches
            .status
            .remove(&cache_identifier("Acme\\Shop\\Domain\\Model\\Product"))
            .unwrap();
        let mut third = ReflectionService::new(shop_registry()).with_caches(caches);
        third.initialize().unwrap();
        third.forget_changed_classes();
        assert!(!third.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));
        assert!(third.is_class_reflected("Acme\\Shop\\Priced"));
    }

    #[test]
    fn production_save_freezes_runtime_cache() {
        let caches = ReflectionCaches::in_memory();
        let settings = Settings::default().with_context(ApplicationContext::Production);
        let classes = available(&["Acme\\Shop\\Domain\\Model\\Product"]);

        let mut build = ReflectionService::new(shop_registry())
            .with_settings(&settings)
            .with_caches(caches.clone());
        build.build_reflection_data(classes.clone()).unwrap();
        build.save_to_cache().unwrap();
        assert!(caches.runtime.is_frozen());

        let mut runtime = ReflectionService::new(ClassRegistry::new())
            .with_settings(&settings)
            .with_caches(caches);
        runtime.build_reflection_data(classes).unwrap();
        assert!(runtime.is_frozen());
        assert!(runtime.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));
        assert!(
            runtime
                .get_class_schema("Acme\\Shop\\Domain\\Model\\Product")
                .is_some()
        );
        assert!(runtime.is_class_annotated_with(
            "Acme\\Shop\\Domain\\Model\\Product",
            &AnnotationKind::Entity
        ));
    }

    #[test]
    fn frozen_packages_are_precompiled_and_reloaded() {
        let directory = std::env::temp_dir().join(format!(
            "flowmeta-precompiled-{}",
            std::process::id()
        ));
        let packages = Arc::new(
            StaticPackages::new(&directory)
                .with_frozen_package(PackageInfo::new("Acme.Shop", "Acme\\Shop")),
        );
        let classes = available(&["Acme\\Shop\\Domain\\Model\\Product"]);

        let mut build = ReflectionService::new(shop_registry())
            .with_caches(ReflectionCaches::in_memory())
            .with_packages(packages.clone());
        build.build_reflection_data(classes).unwrap();
        build.save_to_cache().unwrap();
        assert!(packages.precompiled_reflection_path("Acme.Shop").is_file());

        let mut fresh = ReflectionService::new(ClassRegistry::new())
            .with_caches(ReflectionCaches::in_memory())
            .with_packages(packages.clone());
        fresh.initialize().unwrap();
        assert!(fresh.is_class_reflected("Acme\\Shop\\Domain\\Model\\Product"));

        fresh.unfreeze_package_reflection("Acme.Shop").unwrap();
        assert!(!packages.precompiled_reflection_path("Acme.Shop").is_file());
        let _ = fs::remove_dir_all(directory);
    }
}

//! Trial-scoped object registry
//!
//! Every object added to a trial is registered here. The registry defines the
//! canonical object order used by all per-object arrays of the trial and
//! produces the cleanup commands that destroy everything at trial end.

use std::collections::{HashMap, HashSet};

use trialgen_physics::{FlexActor, FlexContainer, ObjectCategory, PhysicsProperties};

use crate::command::{Command, EngineCommand};
use crate::error::RegistryError;
use crate::flavor::DatasetFlavor;
use crate::object::{ObjectId, ObjectRecord};
use crate::trial::{FlexStatic, RigidStatic, TrialStatic};

/// Registry of the objects in the current trial
///
/// Records and support objects are cleared at the start of each trial. The
/// set of issued identifiers is kept for the whole engine session so that
/// [`ObjectRegistry::generate_id`] never hands out an id twice.
#[derive(Debug)]
pub struct ObjectRegistry {
    /// Records in registration order
    records: Vec<ObjectRecord>,
    /// Index into `records` by id
    index: HashMap<ObjectId, usize>,
    /// Objects without physics metadata that still need cleanup
    support_objects: Vec<ObjectId>,
    /// Container settings of the current flex trial
    flex_container: Option<FlexContainer>,
    /// Next candidate for generated ids (0 is never issued)
    next_id: i32,
    /// Every id used in this session, generated or caller-supplied
    issued: HashSet<ObjectId>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            support_objects: Vec::new(),
            flex_container: None,
            next_id: 1,
            issued: HashSet::new(),
        }
    }

    /// Register an object in the current trial
    ///
    /// Flex categories must go through [`ObjectRegistry::register_flex`].
    pub fn register(
        &mut self,
        id: ObjectId,
        category: ObjectCategory,
        properties: Option<PhysicsProperties>,
    ) -> Result<(), RegistryError> {
        if category.is_flex() {
            return Err(RegistryError::FlexWithoutActor { id, category });
        }
        self.insert(ObjectRecord {
            id,
            category,
            properties,
            flex: None,
        })
    }

    /// Register a flex object with its actor parameters
    pub fn register_flex(&mut self, id: ObjectId, actor: FlexActor) -> Result<(), RegistryError> {
        let category = match actor {
            FlexActor::Solid(_) => ObjectCategory::FlexSolid,
            FlexActor::Soft(_) => ObjectCategory::FlexSoft,
            FlexActor::Cloth(_) => ObjectCategory::FlexCloth,
            FlexActor::Fluid(_) => ObjectCategory::FlexFluid,
        };
        self.insert(ObjectRecord {
            id,
            category,
            properties: None,
            flex: Some(actor),
        })
    }

    /// Register an object that needs cleanup but has no physics metadata
    ///
    /// Support objects are not part of the canonical order.
    pub fn register_support(&mut self, id: ObjectId) -> Result<(), RegistryError> {
        if self.contains(id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.issued.insert(id);
        self.support_objects.push(id);
        Ok(())
    }

    fn insert(&mut self, record: ObjectRecord) -> Result<(), RegistryError> {
        if self.contains(record.id) {
            return Err(RegistryError::DuplicateId(record.id));
        }
        log::debug!("Registered object {} as {:?}", record.id, record.category);
        self.issued.insert(record.id);
        self.index.insert(record.id, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Produce an id never issued before in this engine session
    pub fn generate_id(&mut self) -> ObjectId {
        loop {
            let candidate = ObjectId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1).max(1);
            if self.issued.insert(candidate) {
                return candidate;
            }
        }
    }

    /// Whether the id is registered in the current trial (as record or support object)
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id) || self.support_objects.contains(&id)
    }

    /// Look up a registered record
    pub fn get(&self, id: ObjectId) -> Result<&ObjectRecord, RegistryError> {
        self.index
            .get(&id)
            .map(|&i| &self.records[i])
            .ok_or(RegistryError::UnknownId(id))
    }

    /// Position of the id in canonical order
    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Registered ids in registration order
    pub fn canonical_order(&self) -> Vec<ObjectId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Records in canonical order
    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn support_objects(&self) -> &[ObjectId] {
        &self.support_objects
    }

    /// Number of objects in the canonical order
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set the flex container used by this trial
    pub fn set_flex_container(&mut self, container: FlexContainer) {
        self.flex_container = Some(container);
    }

    pub fn flex_container(&self) -> Option<&FlexContainer> {
        self.flex_container.as_ref()
    }

    /// Destroy commands for every registered object, then every support object
    ///
    /// Pure function of the registry contents; calling it twice yields the
    /// same list.
    pub fn cleanup_commands(&self) -> Vec<Command> {
        let records = self.records.iter().map(|r| {
            if r.category.is_flex() {
                EngineCommand::DestroyFlexObject { id: r.id }
            } else {
                EngineCommand::DestroyObject { id: r.id }
            }
        });
        let support = self
            .support_objects
            .iter()
            .map(|&id| EngineCommand::DestroyObject { id });
        records.chain(support).map(Command::from).collect()
    }

    /// Forget the current trial's objects
    ///
    /// Issued ids are kept so they are never generated again.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
        self.support_objects.clear();
        self.flex_container = None;
    }

    /// Build the static block for the current contents
    pub fn static_record(&self, flavor: DatasetFlavor) -> TrialStatic {
        let object_ids = self.canonical_order();
        let rigid = (flavor == DatasetFlavor::Rigidbodies).then(|| {
            let mut rigid = RigidStatic::default();
            for record in &self.records {
                let properties = record
                    .properties
                    .filter(|_| record.category.has_rigid_properties());
                match properties {
                    Some(p) => {
                        rigid.mass.push(p.mass);
                        rigid.static_friction.push(p.material.static_friction);
                        rigid.dynamic_friction.push(p.material.dynamic_friction);
                        rigid.bounciness.push(p.material.bounciness);
                    }
                    None => {
                        rigid.mass.push(f32::NAN);
                        rigid.static_friction.push(f32::NAN);
                        rigid.dynamic_friction.push(f32::NAN);
                        rigid.bounciness.push(f32::NAN);
                    }
                }
            }
            rigid
        });
        let flex = (flavor == DatasetFlavor::Flex).then(|| FlexStatic {
            container: self.flex_container,
            actors: self
                .records
                .iter()
                .filter_map(|r| r.flex.map(|actor| (r.id, actor)))
                .collect(),
        });
        TrialStatic {
            flavor,
            object_ids,
            rigid,
            flex,
        }
    }
}

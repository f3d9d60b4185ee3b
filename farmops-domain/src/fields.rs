use farmops_store::{EntityStore, Outbox, Record, Snapshot};
use farmops_types::{Change, CommandError, CommandResult, EntityId, Services};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Farmer {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl Record for Farmer {
    const KIND: &'static str = "farmer";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A field worked by one farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    pub id: EntityId,
    pub name: String,
    pub farmer_id: EntityId,
    pub area_hectares: f64,
    #[serde(default)]
    pub crop: Option<String>,
}

impl Record for Field {
    const KIND: &'static str = "field";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Input for [`FieldRegistry::add_field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewField {
    pub name: String,
    pub farmer_id: EntityId,
    pub area_hectares: f64,
    #[serde(default)]
    pub crop: Option<String>,
}

/// Farmers and the fields they work.
///
/// Every field references an existing farmer: `add_field` and
/// `reassign_field` check the reference, and `remove_farmer` takes the
/// farmer's fields with it.
pub struct FieldRegistry {
    farmers: EntityStore<Farmer>,
    fields: EntityStore<Field>,
}

impl FieldRegistry {
    pub fn new(services: Services) -> Self {
        let mut fields = EntityStore::new(services.clone());
        fields.protect("farmer_id");
        Self {
            farmers: EntityStore::new(services),
            fields,
        }
    }

    pub fn farmer(&self, id: &str) -> Option<&Farmer> {
        self.farmers.get(id)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn farmers(&self) -> &[Farmer] {
        self.farmers.list()
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.list()
    }

    pub fn farmers_snapshot(&self) -> Snapshot<Farmer> {
        self.farmers.snapshot()
    }

    pub fn fields_snapshot(&self) -> Snapshot<Field> {
        self.fields.snapshot()
    }

    pub fn add_farmer(
        &mut self,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> CommandResult<EntityId> {
        let (name, phone) = (name.into(), phone.into());
        let (id, _) = self.farmers.insert_with(|id| Farmer { id, name, phone })?;
        Ok(id)
    }

    pub fn insert_farmer(&mut self, farmer: Farmer) -> CommandResult<Snapshot<Farmer>> {
        self.farmers.insert(farmer)
    }

    pub fn update_farmer(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<Farmer>> {
        self.farmers.update(id, patch)
    }

    /// Adds a field for an existing farmer.
    pub fn add_field(&mut self, field: NewField) -> CommandResult<EntityId> {
        self.require_farmer(field.farmer_id.as_str())?;
        let (id, _) = self.fields.insert_with(|id| Field {
            id,
            name: field.name,
            farmer_id: field.farmer_id,
            area_hectares: field.area_hectares,
            crop: field.crop,
        })?;
        Ok(id)
    }

    pub fn insert_field(&mut self, field: Field) -> CommandResult<Snapshot<Field>> {
        self.require_farmer(field.farmer_id.as_str())?;
        self.fields.insert(field)
    }

    /// Patches descriptive field data. `farmer_id` moves only through
    /// [`reassign_field`](Self::reassign_field).
    pub fn update_field(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<Field>> {
        self.fields.update(id, patch)
    }

    pub fn reassign_field(
        &mut self,
        field_id: &str,
        farmer_id: &EntityId,
    ) -> CommandResult<Snapshot<Field>> {
        self.require_farmer(farmer_id.as_str())?;
        let (_, snapshot) = self.fields.modify(field_id, |field| {
            field.farmer_id = farmer_id.clone();
            Ok(())
        })?;
        Ok(snapshot)
    }

    pub fn remove_field(&mut self, id: &str) -> CommandResult<Snapshot<Field>> {
        self.fields.remove(id)
    }

    /// Removes a farmer and every field they own. Returns the removed
    /// field ids.
    pub fn remove_farmer(&mut self, id: &str) -> CommandResult<Vec<EntityId>> {
        self.require_farmer(id)?;
        let owned: Vec<EntityId> = self
            .fields_of(id)
            .into_iter()
            .map(|field| field.id.clone())
            .collect();
        for field_id in &owned {
            self.fields.remove(field_id.as_str())?;
        }
        self.farmers.remove(id)?;
        debug!(farmer = id, fields = owned.len(), "removed farmer with fields");
        Ok(owned)
    }

    /// Fields owned by `farmer_id`, in insertion order.
    pub fn fields_of(&self, farmer_id: &str) -> Vec<&Field> {
        self.fields
            .list()
            .iter()
            .filter(|field| field.farmer_id.as_str() == farmer_id)
            .collect()
    }

    /// Sum of all field areas, in hectares.
    pub fn total_area(&self) -> f64 {
        self.fields.list().iter().map(|field| field.area_hectares).sum()
    }

    pub fn area_of(&self, farmer_id: &str) -> f64 {
        self.fields_of(farmer_id)
            .into_iter()
            .map(|field| field.area_hectares)
            .sum()
    }

    fn require_farmer(&self, id: &str) -> CommandResult<()> {
        if self.farmers.contains(id) {
            Ok(())
        } else {
            Err(CommandError::NotFound {
                kind: Farmer::KIND,
                id: EntityId::from(id),
            })
        }
    }
}

impl Outbox for FieldRegistry {
    /// Changes of both stores, merged in commit order.
    fn drain_changes(&mut self) -> Vec<Change> {
        let mut changes = self.farmers.drain_changes();
        changes.extend(self.fields.drain_changes());
        changes.sort_by_key(|change| change.sequence);
        changes
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        let (farmers, fields): (Vec<_>, Vec<_>) = changes
            .into_iter()
            .partition(|change| change.entity_kind == Farmer::KIND);
        self.farmers.requeue_changes(farmers);
        self.fields.requeue_changes(fields);
    }

    fn pending_changes(&self) -> usize {
        self.farmers.pending_changes() + self.fields.pending_changes()
    }
}

//! The customizer session state machine.
//!
//! One [`Customizer`] per open customizer page. Every public method is
//! a discrete UI or network-completion event; all state lives behind
//! `&mut self`, so there is a single writer and readers always observe
//! a consistent snapshot. Collaborator calls may block the handler;
//! the loading flag is set around them so the UI can gate feedback.
//! In-flight loads are never cancelled — the last response to land
//! wins.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use partwise_assembly::{global_position, parent_attach_point_position, Selection};
use partwise_catalog::{
    Catalog, CatalogError, CompositeMeshId, Part, PartId, PartStatus, PartType, PartTypeId,
    RawParts, Vec3, WorldData,
};
use partwise_checkout::{must_buy, CompositeIndex, CompositeMeshRecord, PurchaseTerms};

use crate::api::ApiClient;
use crate::error::{ApiError, UploadError};
use crate::options::SessionOptions;
use crate::scene::SceneAdapter;
use crate::upload::{name_and_extension, NewPartData, PendingUpload};

/// Mutable customizer settings, patched through the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Customizer title.
    pub name: String,
    /// Price of a composite download, zero when free.
    pub price: f64,
    /// Free-form description.
    pub description: String,
    /// Whether the customizer is hidden from public listings.
    pub is_private: bool,
    /// Cover image location, if any.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SessionSettings {
    fn from_world(world: &WorldData) -> Self {
        Self {
            name: world.name.clone(),
            price: world.price,
            description: world.description.clone(),
            is_private: world.is_private,
            image_url: world.image_url.clone(),
        }
    }
}

/// Outward-facing side effects a handler asks the embedding UI to
/// perform. Returned as values; the session never dispatches globally.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a message to the user.
    Notify(String),
    /// Open a download location.
    OpenUrl(String),
    /// The cart badge should be refreshed.
    RefreshCartAmount,
    /// An item landed in the cart; payload is the backend's response.
    ItemAddedToCart(serde_json::Value),
    /// An access-denied response — prompt for login.
    ShowLogin,
}

/// The customizer session.
pub struct Customizer<S: SceneAdapter, A: ApiClient> {
    scene: S,
    api: A,
    options: SessionOptions,
    settings: SessionSettings,
    catalog: Catalog,
    selection: Selection,
    composites: HashMap<CompositeMeshId, CompositeMeshRecord>,
    owned: HashSet<CompositeMeshId>,
    in_cart: HashSet<CompositeMeshId>,
    owned_index: CompositeIndex,
    cart_index: CompositeIndex,
    staged_upload: Option<PendingUpload>,
    loading: bool,
}

impl<S: SceneAdapter, A: ApiClient> Customizer<S, A> {
    /// Open a session over injected collaborators and backend payloads.
    ///
    /// Builds the catalog (validating the part-type forest), adopts the
    /// world's session settings, initializes the scene slots, applies
    /// the authored container rotation, and renders once.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mut scene: S,
        api: A,
        options: SessionOptions,
        world: &WorldData,
        parts: &RawParts,
        composites: Vec<CompositeMeshRecord>,
        owned: Vec<CompositeMeshId>,
        in_cart: Vec<CompositeMeshId>,
    ) -> Result<Self, CatalogError> {
        let catalog = Catalog::from_world(world, parts)?;

        let part_types: Vec<PartType> = catalog.part_types().cloned().collect();
        scene.init(&part_types);
        if let Some(rotation) = world.container_rotation {
            scene.set_container_rotation(rotation);
        }
        scene.render_scene();

        let mut session = Self {
            scene,
            api,
            options,
            settings: SessionSettings::from_world(world),
            catalog,
            selection: Selection::new(),
            composites: composites.into_iter().map(|c| (c.id, c)).collect(),
            owned: owned.into_iter().collect(),
            in_cart: in_cart.into_iter().collect(),
            owned_index: CompositeIndex::default(),
            cart_index: CompositeIndex::default(),
            staged_upload: None,
            loading: false,
        };
        session.rebuild_indexes();
        Ok(session)
    }

    /// Indexes are derived wholesale from the composite collections;
    /// call after any mutation of them, never patch incrementally.
    fn rebuild_indexes(&mut self) {
        self.owned_index = CompositeIndex::build(
            self.owned
                .iter()
                .filter_map(|id| self.composites.get(id)),
        );
        self.cart_index = CompositeIndex::build(
            self.in_cart
                .iter()
                .filter_map(|id| self.composites.get(id)),
        );
    }

    /// Restore the initial selection from an optional URL fragment.
    ///
    /// The fragment, when present, is a JSON array of part ids; ids
    /// unknown to the catalog are skipped with a warning, and every
    /// part type left unfilled defaults to its first catalog entry.
    /// Loads all selected parts into the scene and replaces the
    /// selection wholesale.
    pub fn restore_selection(&mut self, fragment: Option<&str>) {
        self.loading = true;

        let mut one_of_each: HashMap<PartTypeId, PartId> = HashMap::new();

        if let Some(raw) = fragment.filter(|raw| !raw.is_empty()) {
            match serde_json::from_str::<Vec<PartId>>(raw) {
                Ok(ids) => {
                    for part_id in ids {
                        match self.catalog.part(part_id) {
                            Some(part) => {
                                one_of_each.insert(part.part_type_id, part.id);
                            }
                            None => {
                                warn!(part_id, "fragment references unknown part, skipping");
                            }
                        }
                    }
                }
                Err(err) => warn!(%err, "malformed selection fragment, using defaults"),
            }
        }

        for part_type_id in self.catalog.part_types().map(|pt| pt.id).collect::<Vec<_>>() {
            if one_of_each.contains_key(&part_type_id) {
                continue;
            }
            if let Some(part) = self.catalog.first_part_of_type(part_type_id) {
                one_of_each.insert(part_type_id, part.id);
            }
        }

        let to_load: HashMap<PartTypeId, Part> = one_of_each
            .iter()
            .filter_map(|(&part_type_id, &part_id)| {
                self.catalog
                    .part(part_id)
                    .map(|part| (part_type_id, part.clone()))
            })
            .collect();

        match self.scene.add_all(&to_load) {
            Ok(()) => {
                self.scene.rescale_container_to_fit_objects(None);
                self.scene.render_scene();
                self.selection = Selection::from_entries(one_of_each);
            }
            Err(err) => error!(%err, "failed to load initial parts"),
        }

        self.loading = false;
    }

    /// Equip a part in its slot.
    ///
    /// Loads the part into the scene first; the selection only moves
    /// once the scene accepted it, so a failed load leaves the previous
    /// part equipped.
    pub fn select_part(&mut self, part_type_id: PartTypeId, part_id: PartId) {
        self.loading = true;

        let Some(part) = self.catalog.part(part_id).cloned() else {
            warn!(part_id, "selected part missing from catalog");
            self.loading = false;
            return;
        };

        match self.scene.add(part_type_id, &part) {
            Ok(()) => {
                self.scene
                    .rescale_container_to_fit_objects(Some(self.options.rescale_padding));
                self.scene.render_scene();
                self.selection = self.selection.with_part(part_type_id, part_id);
            }
            Err(err) => {
                let slot = self
                    .catalog
                    .part_type(part_type_id)
                    .map(|pt| pt.name.clone())
                    .unwrap_or_else(|| part_type_id.to_string());
                error!(%err, slot = %slot, "failed to load selected part");
            }
        }

        self.loading = false;
    }

    /// Delete an uploaded part on the backend.
    ///
    /// The part is marked [`PartStatus::Loading`] while the call is in
    /// flight, [`PartStatus::Deleted`] on success, and rolled back to
    /// its previous status on failure.
    pub fn delete_part(&mut self, part_id: PartId) {
        let Some(previous) = self.catalog.set_part_status(part_id, PartStatus::Loading) else {
            warn!(part_id, "delete requested for unknown part");
            return;
        };

        match self.api.delete_part(part_id) {
            Ok(()) => {
                self.catalog.set_part_status(part_id, PartStatus::Deleted);
            }
            Err(err) => {
                self.catalog.set_part_status(part_id, previous);
                error!(%err, part_id, "failed to delete part");
            }
        }
    }

    /// Validate and stage an upload for the wizard.
    pub fn stage_upload(
        &mut self,
        part_type_id: PartTypeId,
        filename: &str,
    ) -> Result<&PendingUpload, UploadError> {
        if self.catalog.part_type(part_type_id).is_none() {
            return Err(UploadError::UnknownPartType(part_type_id));
        }

        let (name, extension) = name_and_extension(filename);
        if !self.options.accepts_extension(extension) {
            return Err(UploadError::UnsupportedExtension(extension.to_string()));
        }

        Ok(&*self.staged_upload.insert(PendingUpload {
            part_type_id,
            name: name.to_string(),
            extension: extension.to_string(),
        }))
    }

    /// Drop the staged upload.
    pub fn cancel_upload(&mut self) {
        self.staged_upload = None;
    }

    /// The upload awaiting wizard completion, if any.
    pub fn staged_upload(&self) -> Option<&PendingUpload> {
        self.staged_upload.as_ref()
    }

    /// Persist a wizard-completed upload, add it to the catalog, and
    /// equip it.
    ///
    /// Returns the assigned part id, or `None` when the backend call
    /// failed (state is left untouched and the failure logged).
    pub fn complete_upload(&mut self, data: NewPartData) -> Option<PartId> {
        self.loading = true;
        self.staged_upload = None;

        let part_type_id = data.part_type_id;
        let name = data.name.clone();

        let result = match self.api.post_part(&data) {
            Ok(id) => {
                let part = data.into_part(id);
                self.catalog.insert_part(part.clone());
                match self.scene.add(part_type_id, &part) {
                    Ok(()) => {
                        self.scene
                            .rescale_container_to_fit_objects(Some(self.options.rescale_padding));
                        self.scene.render_scene();
                    }
                    Err(err) => error!(%err, "failed to place uploaded part"),
                }
                self.selection = self.selection.with_part(part_type_id, id);
                Some(id)
            }
            Err(err) => {
                error!(%err, name = %name, "failed to upload part");
                None
            }
        };

        self.loading = false;
        result
    }

    /// Download (or buy) the composite for the current selection.
    ///
    /// Generates the composite mesh, then either opens the download,
    /// notifies that processing continues, or adds the composite to the
    /// cart — per the purchase-gating decision. Access-denied responses
    /// become [`Effect::ShowLogin`].
    pub fn download(&mut self) -> Vec<Effect> {
        if self.is_selection_in_cart() {
            return vec![Effect::Notify("item added to cart".to_string())];
        }

        let selected = self.selected_part_ids();
        let record = match self.api.generate_customized_mesh(&selected) {
            Ok(record) => record,
            Err(err) => return self.api_failure(err),
        };

        if !self.must_buy() {
            if record.is_ready() {
                match self.api.get_customized_mesh(record.id) {
                    Ok(download) => vec![Effect::OpenUrl(download.file_url)],
                    Err(err) => self.api_failure(err),
                }
            } else {
                vec![Effect::Notify(
                    "You will receive an email when the mesh has finished processing.".to_string(),
                )]
            }
        } else {
            let data = match self.api.add_to_cart(record.id) {
                Ok(data) => data,
                Err(err) => return self.api_failure(err),
            };
            self.in_cart.insert(record.id);
            self.composites.insert(record.id, record);
            self.rebuild_indexes();
            vec![Effect::RefreshCartAmount, Effect::ItemAddedToCart(data)]
        }
    }

    fn api_failure(&self, err: ApiError) -> Vec<Effect> {
        match err {
            ApiError::AccessDenied => vec![Effect::ShowLogin],
            other => {
                error!(%other, "download failed");
                Vec::new()
            }
        }
    }

    /// Patch customizer settings through the API, adopting the stored
    /// fields on success. Returns whether the patch went through.
    pub fn save_settings(&mut self, fields: &SessionSettings) -> bool {
        match self.api.patch_customizer(fields) {
            Ok(updated) => {
                self.settings = updated;
                true
            }
            Err(err) => {
                error!(%err, "failed to save settings");
                false
            }
        }
    }

    /// Whether the current selection must be bought before download.
    ///
    /// Derived fresh from price, mode, and ownership on every call.
    pub fn must_buy(&self) -> bool {
        let terms = PurchaseTerms {
            pay_per_download: self.options.pay_per_download_enabled,
            edit_mode: self.options.edit_mode,
            price: self.settings.price,
        };
        must_buy(&terms, self.user_owns_selection())
    }

    /// Whether the user already generated and owns this exact
    /// combination of parts.
    pub fn user_owns_selection(&self) -> bool {
        self.owned_index.contains(&self.selected_part_ids())
    }

    /// Whether this exact combination is already in the cart.
    pub fn is_selection_in_cart(&self) -> bool {
        self.cart_index.contains(&self.selected_part_ids())
    }

    /// Label for the download button in the current state.
    pub fn download_button_label(&self) -> String {
        if self.must_buy() {
            if self.is_selection_in_cart() {
                "Item already in cart".to_string()
            } else {
                format!("Add To Cart (${})", self.settings.price)
            }
        } else {
            "Download".to_string()
        }
    }

    /// Global offset for a slot's mesh under the current selection.
    pub fn global_position(&self, part_type_id: PartTypeId) -> Vec3 {
        global_position(&self.catalog, &self.selection, part_type_id)
    }

    /// Anchor position on the parent where a slot connects; zero for
    /// roots.
    pub fn parent_attach_point_position(&self, part_type: &PartType) -> Vec3 {
        parent_attach_point_position(&self.catalog, &self.selection, part_type)
    }

    /// The part type attached at a named anchor, if any.
    pub fn child_by_attach_point(&self, attach_point: &str) -> Option<&PartType> {
        self.catalog.child_by_attach_point(attach_point)
    }

    /// Current selection snapshot.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// All selected part ids.
    pub fn selected_part_ids(&self) -> Vec<PartId> {
        self.selection.part_ids()
    }

    /// The catalog backing this session.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether a collaborator call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The injected scene adapter (e.g. to reach its canvas).
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable access to the scene adapter.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MeshDownload;
    use crate::error::SceneError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SceneLog {
        init_slots: usize,
        added: Vec<(PartTypeId, PartId)>,
        batch_sizes: Vec<usize>,
        rescales: Vec<Option<f64>>,
        renders: usize,
        rotations: Vec<Vec3>,
    }

    struct FakeScene {
        log: Rc<RefCell<SceneLog>>,
        fail_add: bool,
    }

    impl FakeScene {
        fn new() -> (Self, Rc<RefCell<SceneLog>>) {
            let log = Rc::new(RefCell::new(SceneLog::default()));
            (
                Self {
                    log: Rc::clone(&log),
                    fail_add: false,
                },
                log,
            )
        }
    }

    impl SceneAdapter for FakeScene {
        fn init(&mut self, part_types: &[PartType]) {
            self.log.borrow_mut().init_slots = part_types.len();
        }

        fn add(
            &mut self,
            part_type_id: PartTypeId,
            part: &Part,
        ) -> Result<(), SceneError> {
            if self.fail_add {
                return Err(SceneError("geometry fetch failed".to_string()));
            }
            self.log.borrow_mut().added.push((part_type_id, part.id));
            Ok(())
        }

        fn add_all(
            &mut self,
            parts: &HashMap<PartTypeId, Part>,
        ) -> Result<(), SceneError> {
            if self.fail_add {
                return Err(SceneError("geometry fetch failed".to_string()));
            }
            self.log.borrow_mut().batch_sizes.push(parts.len());
            Ok(())
        }

        fn rescale_container_to_fit_objects(&mut self, padding: Option<f64>) {
            self.log.borrow_mut().rescales.push(padding);
        }

        fn render_scene(&mut self) {
            self.log.borrow_mut().renders += 1;
        }

        fn set_container_rotation(&mut self, rotation: Vec3) {
            self.log.borrow_mut().rotations.push(rotation);
        }
    }

    #[derive(Default)]
    struct ApiLog {
        deleted: Vec<PartId>,
        posted: usize,
        generated: Vec<Vec<PartId>>,
        carted: Vec<CompositeMeshId>,
    }

    struct FakeApi {
        log: Rc<RefCell<ApiLog>>,
        fail_delete: bool,
        access_denied: bool,
        mesh_status: i64,
        next_mesh_id: CompositeMeshId,
        next_part_id: PartId,
    }

    impl FakeApi {
        fn new() -> (Self, Rc<RefCell<ApiLog>>) {
            let log = Rc::new(RefCell::new(ApiLog::default()));
            (
                Self {
                    log: Rc::clone(&log),
                    fail_delete: false,
                    access_denied: false,
                    mesh_status: partwise_checkout::MESH_STATUS_READY,
                    next_mesh_id: 500,
                    next_part_id: 77,
                },
                log,
            )
        }
    }

    impl ApiClient for FakeApi {
        fn delete_part(&mut self, id: PartId) -> Result<(), ApiError> {
            if self.fail_delete {
                return Err(ApiError::Request("delete failed".to_string()));
            }
            self.log.borrow_mut().deleted.push(id);
            Ok(())
        }

        fn post_part(&mut self, _part: &NewPartData) -> Result<PartId, ApiError> {
            if self.access_denied {
                return Err(ApiError::AccessDenied);
            }
            self.log.borrow_mut().posted += 1;
            Ok(self.next_part_id)
        }

        fn generate_customized_mesh(
            &mut self,
            selected_part_ids: &[PartId],
        ) -> Result<CompositeMeshRecord, ApiError> {
            if self.access_denied {
                return Err(ApiError::AccessDenied);
            }
            self.log
                .borrow_mut()
                .generated
                .push(selected_part_ids.to_vec());
            Ok(CompositeMeshRecord {
                id: self.next_mesh_id,
                selected_part_ids: selected_part_ids.to_vec(),
                status: self.mesh_status,
            })
        }

        fn get_customized_mesh(&mut self, id: CompositeMeshId) -> Result<MeshDownload, ApiError> {
            Ok(MeshDownload {
                file_url: format!("https://dl.example/{id}"),
            })
        }

        fn add_to_cart(&mut self, id: CompositeMeshId) -> Result<serde_json::Value, ApiError> {
            self.log.borrow_mut().carted.push(id);
            Ok(json!({ "cart_item": id }))
        }

        fn patch_customizer(
            &mut self,
            fields: &SessionSettings,
        ) -> Result<SessionSettings, ApiError> {
            Ok(SessionSettings {
                name: fields.name.to_uppercase(),
                ..fields.clone()
            })
        }
    }

    /// Torso (type 1, root) with parts 10/11; head (type 2, attached at
    /// "top") with parts 20/21. World price 10.
    fn fixture_world() -> (WorldData, RawParts) {
        let world: WorldData = serde_json::from_str(
            r#"{
                "name": "robots",
                "price": 10.0,
                "container_rotation": { "x": 0.0, "y": 1.5, "z": 0.0 },
                "groups": [{ "categories": [
                    { "id": 1, "name": "torso" },
                    { "id": 2, "name": "head", "parent": { "id": 1, "attachPoint": "top" } }
                ]}]
            }"#,
        )
        .unwrap();
        let parts: RawParts = serde_json::from_str(
            r#"{
                "allPartTypeIds": [1, 2],
                "byPartTypeId": {
                    "1": [
                        {
                            "id": 10,
                            "name": "torso-a",
                            "metadata": {
                                "position": { "x": 1.0, "y": 0.0, "z": 0.0 },
                                "attachPoints": { "top": { "x": 0.0, "y": 2.0, "z": 0.0 } }
                            }
                        },
                        { "id": 11, "name": "torso-b" }
                    ],
                    "2": [
                        { "id": 20, "name": "head-a" },
                        { "id": 21, "name": "head-b" }
                    ]
                }
            }"#,
        )
        .unwrap();
        (world, parts)
    }

    struct Harness {
        session: Customizer<FakeScene, FakeApi>,
        scene_log: Rc<RefCell<SceneLog>>,
        api_log: Rc<RefCell<ApiLog>>,
    }

    fn harness_with(
        options: SessionOptions,
        composites: Vec<CompositeMeshRecord>,
        owned: Vec<CompositeMeshId>,
        in_cart: Vec<CompositeMeshId>,
        tweak_scene: impl FnOnce(&mut FakeScene),
        tweak_api: impl FnOnce(&mut FakeApi),
    ) -> Harness {
        let (mut scene, scene_log) = FakeScene::new();
        tweak_scene(&mut scene);
        let (mut api, api_log) = FakeApi::new();
        tweak_api(&mut api);
        let (world, parts) = fixture_world();
        let session =
            Customizer::new(scene, api, options, &world, &parts, composites, owned, in_cart)
                .unwrap();
        Harness {
            session,
            scene_log,
            api_log,
        }
    }

    fn harness() -> Harness {
        harness_with(
            SessionOptions::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            |_| {},
            |_| {},
        )
    }

    fn pay_options() -> SessionOptions {
        SessionOptions {
            pay_per_download_enabled: true,
            ..SessionOptions::default()
        }
    }

    #[test]
    fn new_initializes_scene_slots_and_rotation() {
        let h = harness();
        let log = h.scene_log.borrow();
        assert_eq!(log.init_slots, 2);
        assert_eq!(log.rotations, vec![Vec3::new(0.0, 1.5, 0.0)]);
        assert_eq!(log.renders, 1);
    }

    #[test]
    fn restore_without_fragment_selects_first_of_each_type() {
        let mut h = harness();
        h.session.restore_selection(None);

        assert_eq!(h.session.selection().selected(1), Some(10));
        assert_eq!(h.session.selection().selected(2), Some(20));
        let log = h.scene_log.borrow();
        assert_eq!(log.batch_sizes, vec![2]);
        assert_eq!(log.rescales, vec![None]);
        assert!(!h.session.is_loading());
    }

    #[test]
    fn restore_fragment_overrides_defaults() {
        let mut h = harness();
        h.session.restore_selection(Some("[11]"));

        assert_eq!(h.session.selection().selected(1), Some(11));
        assert_eq!(h.session.selection().selected(2), Some(20));
    }

    #[test]
    fn restore_skips_unknown_fragment_ids() {
        let mut h = harness();
        h.session.restore_selection(Some("[999, 21]"));

        assert_eq!(h.session.selection().selected(1), Some(10));
        assert_eq!(h.session.selection().selected(2), Some(21));
    }

    #[test]
    fn restore_tolerates_malformed_fragment() {
        let mut h = harness();
        h.session.restore_selection(Some("not-json"));

        assert_eq!(h.session.selection().selected(1), Some(10));
        assert_eq!(h.session.selection().selected(2), Some(20));
    }

    #[test]
    fn restore_scene_failure_keeps_selection_empty() {
        let mut h = harness_with(
            SessionOptions::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            |scene| scene.fail_add = true,
            |_| {},
        );
        h.session.restore_selection(None);
        assert!(h.session.selection().is_empty());
    }

    #[test]
    fn select_part_updates_selection_and_rescales_with_padding() {
        let mut h = harness();
        h.session.restore_selection(None);
        h.session.select_part(1, 11);

        assert_eq!(h.session.selection().selected(1), Some(11));
        let log = h.scene_log.borrow();
        assert_eq!(log.added, vec![(1, 11)]);
        assert_eq!(log.rescales.last(), Some(&Some(4.0)));
    }

    #[test]
    fn select_part_scene_failure_keeps_previous_selection() {
        let mut h = harness();
        h.session.restore_selection(None);
        h.session.scene_mut().fail_add = true;
        h.session.select_part(1, 11);

        assert_eq!(h.session.selection().selected(1), Some(10));
        assert!(!h.session.is_loading());
    }

    #[test]
    fn delete_part_marks_deleted_on_success() {
        let mut h = harness();
        h.session.delete_part(11);

        assert_eq!(
            h.session.catalog().part(11).unwrap().status,
            PartStatus::Deleted
        );
        assert_eq!(h.api_log.borrow().deleted, vec![11]);
    }

    #[test]
    fn delete_part_rolls_back_on_failure() {
        let mut h = harness_with(
            SessionOptions::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            |_| {},
            |api| api.fail_delete = true,
        );
        h.session.delete_part(11);

        assert_eq!(
            h.session.catalog().part(11).unwrap().status,
            PartStatus::InSync
        );
    }

    #[test]
    fn stage_upload_validates_extension_and_part_type() {
        let mut h = harness();
        assert!(matches!(
            h.session.stage_upload(1, "virus.exe"),
            Err(UploadError::UnsupportedExtension(ext)) if ext == "exe"
        ));
        assert!(matches!(
            h.session.stage_upload(9, "claw.stl"),
            Err(UploadError::UnknownPartType(9))
        ));

        let staged = h.session.stage_upload(1, "mega.claw.stl").unwrap();
        assert_eq!(staged.name, "mega.claw");
        assert_eq!(staged.extension, "stl");

        h.session.cancel_upload();
        assert!(h.session.staged_upload().is_none());
    }

    #[test]
    fn complete_upload_posts_inserts_and_selects() {
        let mut h = harness();
        h.session.restore_selection(None);
        h.session.stage_upload(2, "claw.stl").unwrap();

        let data = NewPartData {
            name: "claw".to_string(),
            part_type_id: 2,
            extension: "stl".to_string(),
            url: "blob:claw".to_string(),
            img: None,
            metadata: Default::default(),
        };
        let id = h.session.complete_upload(data).unwrap();

        assert_eq!(id, 77);
        assert!(h.session.staged_upload().is_none());
        assert_eq!(h.session.catalog().part(77).unwrap().part_type_id, 2);
        assert_eq!(h.session.selection().selected(2), Some(77));
        assert_eq!(h.api_log.borrow().posted, 1);
    }

    #[test]
    fn download_free_and_ready_opens_url() {
        let mut h = harness();
        h.session.restore_selection(None);

        let effects = h.session.download();
        assert_eq!(
            effects,
            vec![Effect::OpenUrl("https://dl.example/500".to_string())]
        );
        let generated = &h.api_log.borrow().generated;
        assert_eq!(generated.len(), 1);
        let mut ids = generated[0].clone();
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn download_still_processing_notifies() {
        let mut h = harness_with(
            SessionOptions::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            |_| {},
            |api| api.mesh_status = 0,
        );
        h.session.restore_selection(None);

        let effects = h.session.download();
        assert!(matches!(&effects[..], [Effect::Notify(msg)] if msg.contains("email")));
    }

    #[test]
    fn download_must_buy_adds_to_cart() {
        let mut h = harness_with(pay_options(), Vec::new(), Vec::new(), Vec::new(), |_| {}, |_| {});
        h.session.restore_selection(None);
        assert!(h.session.must_buy());

        let effects = h.session.download();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect::RefreshCartAmount);
        assert!(matches!(&effects[1], Effect::ItemAddedToCart(_)));
        assert_eq!(h.api_log.borrow().carted, vec![500]);

        // The composite is now indexed: a second download only notifies.
        assert!(h.session.is_selection_in_cart());
        let again = h.session.download();
        assert!(matches!(&again[..], [Effect::Notify(_)]));
    }

    #[test]
    fn owned_selection_is_exempt_from_buying() {
        let record = CompositeMeshRecord {
            id: 300,
            selected_part_ids: vec![10, 20],
            status: 1,
        };
        let mut h = harness_with(
            pay_options(),
            vec![record],
            vec![300],
            Vec::new(),
            |_| {},
            |_| {},
        );
        h.session.restore_selection(None);

        assert!(h.session.user_owns_selection());
        assert!(!h.session.must_buy());
    }

    #[test]
    fn edit_mode_is_exempt_from_buying() {
        let options = SessionOptions {
            pay_per_download_enabled: true,
            edit_mode: true,
            ..SessionOptions::default()
        };
        let mut h = harness_with(options, Vec::new(), Vec::new(), Vec::new(), |_| {}, |_| {});
        h.session.restore_selection(None);
        assert!(!h.session.must_buy());
    }

    #[test]
    fn download_access_denied_prompts_login() {
        let mut h = harness_with(
            SessionOptions::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            |_| {},
            |api| api.access_denied = true,
        );
        h.session.restore_selection(None);

        let effects = h.session.download();
        assert_eq!(effects, vec![Effect::ShowLogin]);
    }

    #[test]
    fn download_button_label_tracks_state() {
        let mut h = harness_with(pay_options(), Vec::new(), Vec::new(), Vec::new(), |_| {}, |_| {});
        h.session.restore_selection(None);
        assert_eq!(h.session.download_button_label(), "Add To Cart ($10)");

        h.session.download();
        assert_eq!(h.session.download_button_label(), "Item already in cart");

        let mut free = harness();
        free.session.restore_selection(None);
        assert_eq!(free.session.download_button_label(), "Download");
    }

    #[test]
    fn save_settings_adopts_patched_fields() {
        let mut h = harness();
        let fields = SessionSettings {
            name: "robots".to_string(),
            price: 12.5,
            description: "now with claws".to_string(),
            is_private: true,
            image_url: None,
        };
        assert!(h.session.save_settings(&fields));
        assert_eq!(h.session.settings().name, "ROBOTS");
        assert_eq!(h.session.settings().price, 12.5);
        assert!(h.session.settings().is_private);
    }

    #[test]
    fn global_position_matches_resolver() {
        let mut h = harness();
        h.session.restore_selection(None);

        let head = h.session.global_position(2);
        assert_eq!(head, Vec3::new(-1.0, 2.0, 0.0));

        let head_type = h.session.catalog().part_type(2).unwrap().clone();
        assert_eq!(
            h.session.parent_attach_point_position(&head_type),
            Vec3::new(0.0, 2.0, 0.0)
        );
        assert_eq!(h.session.child_by_attach_point("top").unwrap().id, 2);
        assert!(h.session.child_by_attach_point("left-arm").is_none());
    }
}

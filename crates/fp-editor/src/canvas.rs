//! Per-plan canvas model.
//!
//! Holds everything about one plan's surface that does not need the DOM: the
//! image's natural size, the current fit, which objects are attached and where,
//! the trash control's position, edit mode and object scale. The bridge owns
//! the elements and asks this model where to put them.

use fp_core::{
    EngineConfig, EngineError, Fit, FloorPlanId, NormalizedPosition, ObjectId, PixelPoint,
    PositionStore, Rect, Size, fit_contain,
};
use std::collections::BTreeMap;

/// Result of dropping a dragged widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Store this new position.
    Moved(NormalizedPosition),
    /// The drop landed on the trash control in edit mode: delete the widget.
    Trashed,
    /// The surface has no size; nothing can be computed.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CanvasModel {
    plan: FloorPlanId,
    image: Option<Size>,
    fit: Option<Fit>,
    objects: BTreeMap<ObjectId, NormalizedPosition>,
    trash: NormalizedPosition,
    edit_mode: bool,
    /// Set by the object layer; only effective in edit mode.
    objects_draggable: bool,
    object_scale: f64,
}

impl CanvasModel {
    pub fn new(plan: FloorPlanId, config: &EngineConfig) -> Self {
        Self {
            plan,
            image: None,
            fit: None,
            objects: BTreeMap::new(),
            trash: config.default_trash_position,
            edit_mode: false,
            objects_draggable: false,
            object_scale: 1.0,
        }
    }

    pub fn plan(&self) -> &FloorPlanId {
        &self.plan
    }

    // ─── Image & fit ─────────────────────────────────────────────────────

    /// Record the natural size of a freshly loaded image. Invalidates the fit.
    pub fn set_image(&mut self, natural: Size) {
        self.image = Some(natural);
        self.fit = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Pick the container size to fit against: the live container when it has
    /// area, else the always-laid-out measurement element.
    pub fn measure(live: Size, measurement: Size) -> Option<Size> {
        if !live.is_empty() {
            Some(live)
        } else if !measurement.is_empty() {
            Some(measurement)
        } else {
            None
        }
    }

    /// Recompute the scale-to-fit for `container`. On `ZeroSize` the previous
    /// fit is kept so visible placement does not jump.
    pub fn refit(&mut self, container: Option<Size>) -> Result<Fit, EngineError> {
        let image = self.image.ok_or(EngineError::ZeroSize)?;
        let container = container.ok_or(EngineError::ZeroSize)?;
        let fit = fit_contain(container, image).ok_or(EngineError::ZeroSize)?;
        log::debug!(
            "plan {}: fit {}x{} at scale {}",
            self.plan,
            fit.surface.width,
            fit.surface.height,
            fit.scale
        );
        self.fit = Some(fit);
        Ok(fit)
    }

    pub fn fit(&self) -> Option<Fit> {
        self.fit
    }

    /// The drag surface box, container-relative.
    pub fn surface(&self) -> Option<Rect> {
        self.fit.map(|f| f.surface)
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    /// Position a new object takes: stored, else requested, else surface center.
    pub fn initial_position(
        stored: Option<NormalizedPosition>,
        requested: Option<NormalizedPosition>,
    ) -> NormalizedPosition {
        stored.or(requested).unwrap_or(NormalizedPosition::CENTER)
    }

    pub fn attach(&mut self, id: ObjectId, position: NormalizedPosition) {
        self.objects.insert(id, position);
    }

    pub fn detach(&mut self, id: &ObjectId) -> Option<NormalizedPosition> {
        self.objects.remove(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().cloned().collect()
    }

    pub fn position_of(&self, id: &ObjectId) -> Option<NormalizedPosition> {
        self.objects.get(id).copied()
    }

    pub fn set_position(&mut self, id: &ObjectId, position: NormalizedPosition) -> bool {
        match self.objects.get_mut(id) {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Pull positions hydrated into the store after this canvas was built:
    /// the trash and every attached object the store knows. Returns true if
    /// anything moved.
    pub fn sync_from_store(&mut self, store: &PositionStore) -> bool {
        let mut changed = false;
        if let Some(trash) = store.get_position_in(&self.plan, &ObjectId::trash())
            && trash != self.trash
        {
            self.trash = trash;
            changed = true;
        }
        for (id, position) in self.objects.iter_mut() {
            if let Some(stored) = store.get_position_in(&self.plan, id)
                && stored != *position
            {
                *position = stored;
                changed = true;
            }
        }
        changed
    }

    /// Pixel center of an object relative to the drag surface.
    pub fn placement(&self, id: &ObjectId) -> Option<PixelPoint> {
        let surface = self.surface()?;
        Some(self.position_of(id)?.to_surface_pixels(surface.size()))
    }

    // ─── Trash ───────────────────────────────────────────────────────────

    pub fn trash_position(&self) -> NormalizedPosition {
        self.trash
    }

    pub fn set_trash_position(&mut self, position: NormalizedPosition) {
        self.trash = position;
    }

    /// Decide what a widget drop means.
    ///
    /// `drop_local` is the drag controller's final position (surface-relative),
    /// `surface_client` and `trash_client` are bounding boxes in client pixels.
    /// The drop point is converted to client space before the trash test.
    pub fn resolve_drop(
        &self,
        drop_local: PixelPoint,
        surface_client: Rect,
        trash_client: Option<Rect>,
    ) -> DropOutcome {
        if self.edit_mode
            && let Some(trash) = trash_client
            && trash.contains(surface_client.to_client(drop_local))
        {
            return DropOutcome::Trashed;
        }
        match NormalizedPosition::from_surface_pixels(drop_local, surface_client.size()) {
            Some(p) => DropOutcome::Moved(p),
            None => DropOutcome::Ignored,
        }
    }

    /// Resolve a widget drop and record it in `store`.
    ///
    /// A move updates the object and schedules a save, unless the object is
    /// already there (a click without movement). A trash drop detaches the
    /// object and forgets its entry. The caller removes the widget itself.
    pub fn apply_drop(
        &mut self,
        id: &ObjectId,
        drop_local: PixelPoint,
        surface_client: Rect,
        trash_client: Option<Rect>,
        store: &mut PositionStore,
    ) -> DropOutcome {
        let outcome = self.resolve_drop(drop_local, surface_client, trash_client);
        match outcome {
            DropOutcome::Moved(position) => {
                if self.position_of(id) != Some(position) {
                    self.set_position(id, position);
                    store.update_position_in(&self.plan, id.clone(), position, false);
                }
            }
            DropOutcome::Trashed => {
                self.detach(id);
                store.remove_position_in(&self.plan, id);
                log::info!("plan {}: {id} dropped on the trash", self.plan);
            }
            DropOutcome::Ignored => {
                log::debug!("plan {}: drop of {id} on an empty surface ignored", self.plan);
            }
        }
        outcome
    }

    /// Record where the trash control was dropped. Returns its new position,
    /// or `None` when the surface has no size.
    pub fn apply_trash_drop(
        &mut self,
        drop_local: PixelPoint,
        surface: Size,
        store: &mut PositionStore,
    ) -> Option<NormalizedPosition> {
        let position = NormalizedPosition::from_surface_pixels(drop_local, surface)?;
        if position != self.trash {
            self.trash = position;
            store.update_position_in(&self.plan, ObjectId::trash(), position, false);
        }
        Some(position)
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Edit mode alone does not make objects draggable; the object layer
    /// turns it on separately.
    pub fn set_objects_draggable(&mut self, on: bool) {
        self.objects_draggable = on;
    }

    pub fn objects_draggable(&self) -> bool {
        self.edit_mode && self.objects_draggable
    }

    /// Scale factor applied to every widget. Non-positive values are rejected.
    pub fn set_object_scale(&mut self, scale: f64) -> bool {
        if scale > 0.0 && scale.is_finite() {
            self.object_scale = scale;
            true
        } else {
            log::warn!("plan {}: ignoring invalid object scale {scale}", self.plan);
            false
        }
    }

    pub fn object_scale(&self) -> f64 {
        self.object_scale
    }

    /// CSS transform for a widget: centered on its coordinate, then scaled.
    pub fn widget_transform(&self) -> String {
        if (self.object_scale - 1.0).abs() < f64::EPSILON {
            "translate(-50%, -50%)".to_string()
        } else {
            format!("translate(-50%, -50%) scale({})", self.object_scale)
        }
    }
}

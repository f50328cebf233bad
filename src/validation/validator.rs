//! The validator runs every rule module against a body and collects findings.
use super::finding::{Finding, FindingKind, Severity};
use super::rules::{geology, habitability, orbits, stellar, zones};
use crate::compute::{ResolutionEngine, ResolutionError};
use crate::config::ValidationConfig;
use crate::formulas::{QuantityId, Target};
use crate::store::{BodyId, BodyKind, Composition, Placement};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Read-only checks over resolved quantities.
///
/// Validation never edits the hierarchy. It resolves whatever it needs through
/// the engine, so repeated runs are served from the caches.
pub struct Validator<'e, 'a> {
    engine: &'e ResolutionEngine<'a>,
    config: ValidationConfig,
}

impl<'e, 'a> Validator<'e, 'a> {
    pub fn new(engine: &'e ResolutionEngine<'a>) -> Self {
        Self::with_config(engine, ValidationConfig::default())
    }

    pub fn with_config(engine: &'e ResolutionEngine<'a>, config: ValidationConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Findings for one body in rule order: orbits, zones, habitability,
    /// stellar, geology.
    pub fn validate(&self, body: BodyId) -> Result<Vec<Finding>, ResolutionError> {
        let mut scope = Scope::new(self.engine, &self.config, body)?;
        orbits::check(&mut scope)?;
        zones::check(&mut scope)?;
        habitability::check(&mut scope)?;
        stellar::check(&mut scope)?;
        geology::check(&mut scope)?;
        debug!(%body, findings = scope.findings.len(), "validated");
        Ok(scope.findings)
    }

    /// Validates every body in parallel.
    pub fn validate_system(&self) -> Result<BTreeMap<BodyId, Vec<Finding>>, ResolutionError> {
        let ids: Vec<BodyId> = self.engine.system().ids().collect();
        ids.par_iter()
            .map(|&id| self.validate(id).map(|findings| (id, findings)))
            .collect()
    }
}

/// The body under validation plus the findings collected so far.
pub(crate) struct Scope<'e, 'a> {
    engine: &'e ResolutionEngine<'a>,
    pub config: &'e ValidationConfig,
    pub body: BodyId,
    pub kind: BodyKind,
    pub placement: Placement,
    pub composition: Option<Composition>,
    name: String,
    findings: Vec<Finding>,
}

impl<'e, 'a> Scope<'e, 'a> {
    fn new(
        engine: &'e ResolutionEngine<'a>,
        config: &'e ValidationConfig,
        body: BodyId,
    ) -> Result<Self, ResolutionError> {
        let system = engine.system();
        let b = system.body(body).ok_or(ResolutionError::UnknownBody(body))?;
        Ok(Self {
            engine,
            config,
            body,
            kind: b.kind(),
            placement: system.placement_of(body).unwrap_or(Placement::Root),
            composition: b.composition(),
            name: b.name().to_string(),
            findings: Vec::new(),
        })
    }

    #[inline]
    pub fn own(&self, quantity: QuantityId) -> Result<Option<f64>, ResolutionError> {
        self.of(Target::Own, quantity)
    }

    /// Value of `quantity` on a related body; `None` if the body does not
    /// exist or the quantity is unresolved.
    pub fn of(&self, target: Target, quantity: QuantityId) -> Result<Option<f64>, ResolutionError> {
        match self.engine.system().target_of(self.body, target) {
            Some(b) => Ok(self.engine.resolve(b, quantity)?.value()),
            None => Ok(None),
        }
    }

    pub fn report(&mut self, severity: Severity, kind: FindingKind, quantity: QuantityId, message: String) {
        self.findings.push(Finding {
            body: self.body,
            body_name: self.name.clone(),
            severity,
            kind,
            quantity,
            message,
        });
    }

    #[inline]
    pub fn is_world(&self) -> bool {
        matches!(self.kind, BodyKind::Planet | BodyKind::Satellite)
    }
}

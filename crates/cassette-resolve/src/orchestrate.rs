//! Fan-out/fan-in resolution across a cassette's modules.
//!
//! All network fetches for one pass run in parallel; results are joined
//! back to their originating module by position in the input slice, so
//! completion order can never change assembly order.

use cassette_core::{Cassette, Module};
use rayon::prelude::*;
use uuid::Uuid;

use crate::cache::SequenceCache;
use crate::{ResolveError, ResolveOptions, Resolved, SequenceResolver};

/// A non-fatal resolution problem, surfaced to the caller alongside the
/// (possibly stale or empty) module it concerns.
#[derive(Debug, Clone)]
pub struct ResolutionWarning {
    pub module_id: Uuid,
    pub symbol: String,
    pub message: String,
}

/// Bring every stale module's sequence up to date, in place.
///
/// Serial cache pass first, then one parallel fan-out over the misses,
/// then a serial join-back and cache write. Failures downgrade to
/// warnings: the module keeps whatever sequence it already had, which
/// may be empty.
pub fn resolve_modules(
    modules: &mut [Module],
    resolver: &dyn SequenceResolver,
    cache: &SequenceCache,
    species: &str,
    options: &ResolveOptions,
) -> Vec<ResolutionWarning> {
    let mut warnings = Vec::new();
    let mut misses: Vec<usize> = Vec::new();

    for (i, module) in modules.iter_mut().enumerate() {
        if !module.perturbation.is_resolvable() {
            continue;
        }
        if module.is_current() && !options.force_refresh {
            continue;
        }
        if !options.force_refresh {
            match cache.get(species, &module.name, module.perturbation) {
                Ok(Some((sequence, source))) => {
                    log::debug!("cache hit for {} ({})", module.name, source.as_str());
                    module.sequence = sequence;
                    module.source = Some(source);
                    continue;
                }
                Ok(None) => {}
                Err(e) => log::warn!("cache lookup failed for {}: {e}", module.name),
            }
        }
        misses.push(i);
    }

    let snapshot: &[Module] = modules;
    let fetched: Vec<(usize, Result<Resolved, ResolveError>)> = misses
        .par_iter()
        .map(|&i| (i, resolve_one(resolver, &snapshot[i], options)))
        .collect();

    for (i, outcome) in fetched {
        let module = &mut modules[i];
        match outcome {
            Ok(resolved) => {
                if let Err(e) =
                    cache.put(species, &module.name, resolved.source, &resolved.sequence)
                {
                    log::warn!("cache write failed for {}: {e}", module.name);
                }
                module.sequence = resolved.sequence;
                module.source = Some(resolved.source);
            }
            Err(e) => {
                let fallback = if module.sequence.is_empty() {
                    "no sequence available"
                } else {
                    "keeping previous sequence"
                };
                log::warn!("resolution failed for {}: {e} ({fallback})", module.name);
                warnings.push(ResolutionWarning {
                    module_id: module.id,
                    symbol: module.name.clone(),
                    message: format!("{e} ({fallback})"),
                });
            }
        }
    }

    warnings
}

/// One resolution attempt, retried once with relaxed type enforcement
/// when the strict pass finds no matching-type source.
fn resolve_one(
    resolver: &dyn SequenceResolver,
    module: &Module,
    options: &ResolveOptions,
) -> Result<Resolved, ResolveError> {
    match resolver.resolve(module, options) {
        Err(ResolveError::NoSource { .. }) if options.enforce_type_source => {
            let relaxed = ResolveOptions {
                enforce_type_source: false,
                ..*options
            };
            resolver.resolve(module, &relaxed)
        }
        outcome => outcome,
    }
}

pub fn resolve_cassette(
    cassette: &mut Cassette,
    resolver: &dyn SequenceResolver,
    cache: &SequenceCache,
    species: &str,
    options: &ResolveOptions,
) -> Vec<ResolutionWarning> {
    resolve_modules(&mut cassette.modules, resolver, cache, species, options)
}

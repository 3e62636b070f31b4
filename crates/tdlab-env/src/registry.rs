//! Environment registry for easy environment creation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tdlab_core::{Environment, RLError, Result};

use crate::{CartPoleEnv, MountainCarEnv, PlaneWalkEnv, TimeLimit};

/// Boxed environment as handed out by the registry
pub type BoxedEnv = Box<dyn Environment>;

type EnvConstructor = Box<dyn Fn(Option<u64>) -> Result<BoxedEnv> + Send + Sync>;

/// Step budget of the registered mountain car
pub const MOUNTAIN_CAR_MAX_STEPS: usize = 200;
/// Step budget of the registered cart pole
pub const CART_POLE_MAX_STEPS: usize = 500;

lazy_static::lazy_static! {
    static ref REGISTRY: Arc<Mutex<EnvRegistry>> = Arc::new(Mutex::new(EnvRegistry::with_builtins()));
}

/// Name-keyed environment constructors
///
/// Constructors receive an optional seed for the environment's own random
/// source.
pub struct EnvRegistry {
    /// Registered environments
    envs: HashMap<String, EnvConstructor>,
}

impl EnvRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            envs: HashMap::new(),
        }
    }

    /// Registry holding `mountain_car`, `cart_pole` and `plane_walk`
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("mountain_car", |seed| {
            Ok(Box::new(TimeLimit::new(MountainCarEnv::new(seed), MOUNTAIN_CAR_MAX_STEPS)) as BoxedEnv)
        });
        registry.register("cart_pole", |seed| {
            Ok(Box::new(TimeLimit::new(CartPoleEnv::new(seed), CART_POLE_MAX_STEPS)) as BoxedEnv)
        });
        registry.register("plane_walk", |_| Ok(Box::new(PlaneWalkEnv::new()) as BoxedEnv));
        registry
    }

    /// Register an environment
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Option<u64>) -> Result<BoxedEnv> + Send + Sync + 'static,
    {
        self.envs.insert(name.into(), Box::new(constructor));
    }

    /// Create an environment by name
    pub fn make(&self, name: &str, seed: Option<u64>) -> Result<BoxedEnv> {
        self.envs
            .get(name)
            .ok_or_else(|| RLError::Environment(format!("Unknown environment: {name}")))
            .and_then(|constructor| constructor(seed))
    }

    /// List registered environments, sorted by name
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.envs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvRegistry")
            .field("envs", &self.list())
            .finish()
    }
}

fn registry() -> Result<MutexGuard<'static, EnvRegistry>> {
    REGISTRY
        .lock()
        .map_err(|_| RLError::Environment("environment registry lock poisoned".into()))
}

/// Register an environment globally
pub fn register_env<F>(name: impl Into<String>, constructor: F) -> Result<()>
where
    F: Fn(Option<u64>) -> Result<BoxedEnv> + Send + Sync + 'static,
{
    registry()?.register(name, constructor);
    Ok(())
}

/// Create an environment by name
pub fn make_env(name: &str, seed: Option<u64>) -> Result<BoxedEnv> {
    registry()?.make(name, seed)
}

/// List all registered environments
pub fn list_envs() -> Result<Vec<String>> {
    Ok(registry()?.list())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        assert_eq!(
            list_envs().unwrap(),
            vec!["cart_pole", "mountain_car", "plane_walk"]
        );
        let env = make_env("mountain_car", Some(0)).unwrap();
        assert_eq!(env.action_space().as_discrete().unwrap().n, 3);
        assert!(matches!(make_env("acrobot", None), Err(RLError::Environment(_))));
    }

    #[test]
    fn test_local_registration() {
        let mut registry = EnvRegistry::new();
        registry.register("walk", |_| Ok(Box::new(PlaneWalkEnv::new()) as BoxedEnv));
        assert!(registry.make("walk", None).is_ok());
        assert_eq!(registry.list(), vec!["walk"]);
    }

    #[test]
    fn test_mountain_car_budget() {
        let mut env = make_env("mountain_car", Some(4)).unwrap();
        env.reset().unwrap();
        let steps = (0..1000).take_while(|_| !env.step(1).unwrap().is_last()).count();
        assert_eq!(steps + 1, MOUNTAIN_CAR_MAX_STEPS);
    }
}

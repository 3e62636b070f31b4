//! Classic control environments

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tdlab_core::{BoxSpace, DiscreteSpace, Environment, RLError, Result, Space, Step};

fn env_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// CartPole environment
///
/// Reward 1 for every step the pole stays up. The observation box is finite
/// so that every coding scheme can be laid over it; velocities beyond the
/// box are clamped by the codings.
#[derive(Debug, Clone)]
pub struct CartPoleEnv {
    /// Current state
    state: CartPoleState,
    /// Configuration
    config: CartPoleConfig,
    rng: StdRng,
}

#[derive(Debug, Clone)]
struct CartPoleState {
    x: f64,         // Cart position
    x_dot: f64,     // Cart velocity
    theta: f64,     // Pole angle
    theta_dot: f64, // Pole angular velocity
}

#[derive(Debug, Clone)]
struct CartPoleConfig {
    gravity: f64,
    mass_cart: f64,
    mass_pole: f64,
    length: f64,
    force_mag: f64,
    tau: f64,
    x_threshold: f64,
    theta_threshold: f64,
    max_x_dot: f64,
    max_theta_dot: f64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            x_threshold: 2.4,
            theta_threshold: 12.0_f64.to_radians(),
            max_x_dot: 3.0,
            max_theta_dot: 3.5,
        }
    }
}

impl CartPoleEnv {
    /// Create a new CartPole environment
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            state: CartPoleState {
                x: 0.0,
                x_dot: 0.0,
                theta: 0.0,
                theta_dot: 0.0,
            },
            config: CartPoleConfig::default(),
            rng: env_rng(seed),
        }
    }

    fn observation(&self) -> Vec<f64> {
        vec![
            self.state.x,
            self.state.x_dot,
            self.state.theta,
            self.state.theta_dot,
        ]
    }

    fn is_done(&self) -> bool {
        self.state.x.abs() > self.config.x_threshold
            || self.state.theta.abs() > self.config.theta_threshold
    }
}

impl Environment for CartPoleEnv {
    fn observation_space(&self) -> Space {
        let high = vec![
            self.config.x_threshold * 2.0,
            self.config.max_x_dot,
            self.config.theta_threshold * 2.0,
            self.config.max_theta_dot,
        ];
        let low = high.iter().map(|&x| -x).collect();
        Space::Box(BoxSpace { low, high })
    }

    fn action_space(&self) -> Space {
        DiscreteSpace::new(2).into() // 0: push left, 1: push right
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        let mut sample = || self.rng.gen_range(-0.05..0.05);
        self.state = CartPoleState {
            x: sample(),
            x_dot: sample(),
            theta: sample(),
            theta_dot: sample(),
        };
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let force = match action {
            0 => -self.config.force_mag,
            1 => self.config.force_mag,
            _ => return Err(RLError::InvalidAction(format!("Invalid action: {action}"))),
        };

        let cos_theta = self.state.theta.cos();
        let sin_theta = self.state.theta.sin();

        let total_mass = self.config.mass_cart + self.config.mass_pole;
        let pole_mass_length = self.config.mass_pole * self.config.length;

        let temp =
            (force + pole_mass_length * self.state.theta_dot.powi(2) * sin_theta) / total_mass;
        let theta_acc = (self.config.gravity * sin_theta - cos_theta * temp)
            / (self.config.length
                * (4.0 / 3.0 - self.config.mass_pole * cos_theta.powi(2) / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        let dt = self.config.tau;
        self.state.x += dt * self.state.x_dot;
        self.state.x_dot += dt * x_acc;
        self.state.theta += dt * self.state.theta_dot;
        self.state.theta_dot += dt * theta_acc;

        Ok(Step {
            observation: self.observation(),
            reward: 1.0,
            done: self.is_done(),
            truncated: false,
        })
    }
}

/// Mountain Car environment
///
/// Reward −1 per step until the car reaches the flag on the right hill.
#[derive(Debug, Clone)]
pub struct MountainCarEnv {
    /// Current state
    state: MountainCarState,
    /// Configuration
    config: MountainCarConfig,
    rng: StdRng,
}

#[derive(Debug, Clone)]
struct MountainCarState {
    position: f64,
    velocity: f64,
}

#[derive(Debug, Clone)]
struct MountainCarConfig {
    min_position: f64,
    max_position: f64,
    max_speed: f64,
    goal_position: f64,
    goal_velocity: f64,
    force: f64,
    gravity: f64,
}

impl Default for MountainCarConfig {
    fn default() -> Self {
        Self {
            min_position: -1.2,
            max_position: 0.6,
            max_speed: 0.07,
            goal_position: 0.5,
            goal_velocity: 0.0,
            force: 0.001,
            gravity: 0.0025,
        }
    }
}

impl MountainCarEnv {
    /// Create a new Mountain Car environment
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            state: MountainCarState {
                position: -0.5,
                velocity: 0.0,
            },
            config: MountainCarConfig::default(),
            rng: env_rng(seed),
        }
    }

    fn observation(&self) -> Vec<f64> {
        vec![self.state.position, self.state.velocity]
    }
}

impl Environment for MountainCarEnv {
    fn observation_space(&self) -> Space {
        Space::Box(BoxSpace {
            low: vec![self.config.min_position, -self.config.max_speed],
            high: vec![self.config.max_position, self.config.max_speed],
        })
    }

    fn action_space(&self) -> Space {
        DiscreteSpace::new(3).into() // 0: push left, 1: no push, 2: push right
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        self.state = MountainCarState {
            position: self.rng.gen_range(-0.6..-0.4),
            velocity: 0.0,
        };
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let force = match action {
            0 => -1.0,
            1 => 0.0,
            2 => 1.0,
            _ => return Err(RLError::InvalidAction(format!("Invalid action: {action}"))),
        };

        self.state.velocity += force * self.config.force
            + (3.0 * self.state.position).cos() * (-self.config.gravity);
        self.state.velocity = self
            .state
            .velocity
            .clamp(-self.config.max_speed, self.config.max_speed);

        self.state.position += self.state.velocity;
        self.state.position = self
            .state
            .position
            .clamp(self.config.min_position, self.config.max_position);

        // inelastic left wall
        if self.state.position <= self.config.min_position && self.state.velocity < 0.0 {
            self.state.velocity = 0.0;
        }

        let done = self.state.position >= self.config.goal_position
            && self.state.velocity >= self.config.goal_velocity;

        Ok(Step {
            observation: self.observation(),
            reward: -1.0,
            done,
            truncated: false,
        })
    }
}

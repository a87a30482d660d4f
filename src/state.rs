//! Chain state storage.
//!
//! Positions live in an "encoded" space: normalized coordinates multiplied by
//! [`ChainConfig::position_scale`] (255 by default). The simulation works in
//! that space; the ribbon and debug passes decode back to `[0, 1]`.
//!
//! State is double buffered. [`DoubleBuffer`] holds both slots and the frame
//! parity, for CPU vectors and GPU textures alike.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ChainConfig;

/// Value of the two sentinel channels of every texel.
pub const MARKER: f32 = 1.0;

/// One point as stored in the RGBA32F state texture.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Texel {
    pub position: [f32; 2],
    pub marker: [f32; 2],
}

impl Texel {
    pub fn new(position: Vec2) -> Self {
        Self {
            position: position.to_array(),
            marker: [MARKER; 2],
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }
}

/// Normalized position to encoded texel.
#[inline]
pub fn encode(position: Vec2, scale: f32) -> Texel {
    Texel::new(position * scale)
}

/// Encoded texel back to a normalized position.
#[inline]
pub fn decode(texel: &Texel, scale: f32) -> Vec2 {
    texel.position() / scale
}

/// Initial chain: a line from `x = 0.5` to the right with a small vertical
/// jitter per point, in encoded units.
///
/// The jitter keeps neighbors from ever coinciding at startup.
pub fn seed_positions(config: &ChainConfig) -> Vec<Vec2> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let n = config.point_count as f32;

    (0..config.point_count)
        .map(|i| {
            let x = (i as f32 / n) * 0.5 + 0.5;
            let noise = rng.gen::<f32>() * 2.0 - 1.0;
            let y = 0.5 + noise / n / 2.0 * config.jitter;
            Vec2::new(x, y) * config.position_scale
        })
        .collect()
}

/// Encoded positions packed for upload.
pub fn to_texels(positions: &[Vec2]) -> Vec<Texel> {
    positions.iter().copied().map(Texel::new).collect()
}

/// Which slot is read and which is written in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    pub current: usize,
    pub next: usize,
}

impl Roles {
    pub fn for_frame(frame: u64) -> Self {
        let current = (frame % 2) as usize;
        Self {
            current,
            next: 1 - current,
        }
    }
}

/// Two slots with alternating read/write roles.
#[derive(Debug)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    frame: u64,
}

impl<T> DoubleBuffer<T> {
    /// Slot 0 is read first.
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            frame: 0,
        }
    }

    /// Frames swapped so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn roles(&self) -> Roles {
        Roles::for_frame(self.frame)
    }

    /// Slot read by this frame's simulation step.
    #[inline]
    pub fn current(&self) -> &T {
        &self.slots[self.roles().current]
    }

    /// Slot written by this frame's simulation step.
    #[inline]
    pub fn next(&self) -> &T {
        &self.slots[self.roles().next]
    }

    #[inline]
    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index]
    }

    /// Borrow the read slot and the write slot at once.
    pub fn split(&mut self) -> (&T, &mut T) {
        let [first, second] = &mut self.slots;
        if self.frame % 2 == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        }
    }

    /// Hand the written slot over to the next frame.
    pub fn swap(&mut self) -> Roles {
        self.frame += 1;
        self.roles()
    }
}

//! Error types for ropeline.
//!
//! Only startup can fail: acquiring the window, the GPU and the state
//! textures. Once a frame loop is running, numerical trouble is handled
//! locally inside the passes and never surfaces here.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error(
        "no compatible GPU adapter found. Ensure your system has a GPU with \
         WebGPU/Vulkan/Metal/DX12 support"
    )]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("surface is not compatible with the selected adapter")]
    IncompatibleSurface,
    /// The chain has more points than a texture row can hold on this device.
    #[error("state texture needs {points} texels but the device allows at most {limit} per row")]
    StateTooLarge { points: u32, limit: u32 },
}

/// Errors that can occur when starting or running the chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// A configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A configuration file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

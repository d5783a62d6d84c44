//! # Buffer State Module
//!
//! This module provides a centralized registry for the GPU buffers the renderer uses.
//!
//! ## Key Features
//!
//! * Named buffers (`&'static str` keys) created once and looked up by name
//! * Bounds-checked writes that report failures instead of panicking
//! * Grow-on-write for per-frame streams whose size changes with the view
//! * Memory analytics, logged on demand
//!
//! The camera uniform, the static cube geometry and the per-frame instance
//! stream all live here.

use std::collections::HashMap;

use log::{debug, info};
use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, Queue};

use super::error::BufferError;

/// Analytics data for a GPU buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Bytes covered by writes since the buffer was (re)created
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
    /// Number of times the buffer was reallocated to fit a larger write
    pub times_grown: u64,
}

impl BufferAnalytics {
    fn record_write(&mut self, offset: u64, len: u64) {
        self.used_memory = self.used_memory.max(offset + len);
        self.times_written += 1;
    }
}

/// Central registry for GPU buffers.
///
/// # Examples
///
/// ```ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer_init(
///     "cube_vertices",
///     wgpu::util::BufferInitDescriptor {
///         label: Some("cube_vertices"),
///         contents: bytemuck::cast_slice(&vertices),
///         usage: wgpu::BufferUsages::VERTEX,
///     },
/// );
///
/// let vertex_buffer = buffer_state.get_buffer("cube_vertices")?;
/// ```
pub struct BufferState {
    device: Device,
    queue: Queue,
    buffers: HashMap<&'static str, Buffer>,
    buffer_analytics: HashMap<&'static str, BufferAnalytics>,
}

impl BufferState {
    /// Creates an empty registry.
    ///
    /// # Arguments
    ///
    /// * `device` - Handle to the GPU device
    /// * `queue` - Handle to the GPU command queue
    pub fn new(device: Device, queue: Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
        }
    }

    /// Creates an empty buffer, replacing any buffer with the same name.
    pub fn create_buffer(&mut self, buffer_name: &'static str, buffer_descriptor: wgpu::BufferDescriptor) {
        let buffer = self.device.create_buffer(&buffer_descriptor);
        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics.insert(
            buffer_name,
            BufferAnalytics {
                allocated_memory: buffer_descriptor.size,
                ..BufferAnalytics::default()
            },
        );
    }

    /// Creates a buffer and initializes it with data, replacing any buffer
    /// with the same name.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let size = init_descriptor.contents.len() as u64;
        let buffer = self.device.create_buffer_init(&init_descriptor);
        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics.insert(
            buffer_name,
            BufferAnalytics {
                allocated_memory: size,
                used_memory: size,
                times_written: 1,
                times_grown: 0,
            },
        );
    }

    /// Writes raw bytes to a buffer.
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Name of the buffer to write to
    /// * `offset` - Byte offset in the buffer to start writing
    /// * `data` - Raw byte data to write
    ///
    /// # Errors
    ///
    /// [`BufferError::Unknown`] if the buffer does not exist,
    /// [`BufferError::OutOfBounds`] if the write would exceed its size.
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> Result<(), BufferError> {
        let buffer = self.get_buffer(buffer_name)?;
        let len = data.len() as u64;
        let size = buffer.size();
        if offset + len > size {
            return Err(BufferError::OutOfBounds {
                name: buffer_name,
                offset,
                len,
                size,
            });
        }

        self.queue.write_buffer(buffer, offset, data);
        if let Some(analytics) = self.buffer_analytics.get_mut(buffer_name) {
            analytics.record_write(offset, len);
        }
        Ok(())
    }

    /// Writes `data` at offset zero, first reallocating the buffer when it is
    /// missing or too small. Capacity at least doubles on each growth so a
    /// slowly widening view does not reallocate every frame.
    ///
    /// Returns `true` when the buffer was (re)created.
    pub fn write_or_grow(&mut self, buffer_name: &'static str, data: &[u8], usage: BufferUsages) -> bool {
        let len = data.len() as u64;
        let current = self.buffers.get(buffer_name).map(Buffer::size);
        let grown = match current {
            Some(size) if size >= len => false,
            _ => {
                let previous = current.unwrap_or(0);
                let size = (previous * 2)
                    .max(len)
                    .max(wgpu::COPY_BUFFER_ALIGNMENT)
                    .next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
                debug!("Growing buffer '{}' from {} to {} bytes", buffer_name, previous, size);

                let times_grown = self
                    .buffer_analytics
                    .get(buffer_name)
                    .map_or(0, |analytics| analytics.times_grown + 1);
                self.create_buffer(
                    buffer_name,
                    wgpu::BufferDescriptor {
                        label: Some(buffer_name),
                        size,
                        usage: usage | BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    },
                );
                if let Some(analytics) = self.buffer_analytics.get_mut(buffer_name) {
                    analytics.times_grown = times_grown;
                }
                true
            }
        };

        if let Some(buffer) = self.buffers.get(buffer_name) {
            if !data.is_empty() {
                self.queue.write_buffer(buffer, 0, data);
            }
        }
        if let Some(analytics) = self.buffer_analytics.get_mut(buffer_name) {
            analytics.record_write(0, len);
        }
        grown
    }

    /// Gets a buffer by name.
    pub fn get_buffer(&self, buffer_name: &'static str) -> Result<&Buffer, BufferError> {
        self.buffers
            .get(buffer_name)
            .ok_or(BufferError::Unknown(buffer_name))
    }

    /// Gets a binding resource for the entire buffer.
    pub fn get_entire_binding(&self, buffer_name: &'static str) -> Result<wgpu::BindingResource, BufferError> {
        Ok(self.get_buffer(buffer_name)?.as_entire_binding())
    }

    /// Analytics for one buffer.
    pub fn analytics(&self, buffer_name: &'static str) -> Option<BufferAnalytics> {
        self.buffer_analytics.get(buffer_name).copied()
    }

    /// Gets the total allocated memory across all buffers in bytes.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }

    /// Gets the total used memory across all buffers in bytes.
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.used_memory)
            .sum()
    }

    /// Logs per-buffer and total memory analytics.
    pub fn log_analytics(&self) {
        let mut names: Vec<_> = self.buffer_analytics.keys().copied().collect();
        names.sort_unstable();
        for name in names {
            let analytics = self.buffer_analytics[name];
            info!(
                "Buffer '{}': {} bytes allocated, {} used, {} writes, grown {} times",
                name,
                analytics.allocated_memory,
                analytics.used_memory,
                analytics.times_written,
                analytics.times_grown
            );
        }
        info!("Total allocated memory: {}", self.get_total_allocated_memory());
        info!("Total used memory: {}", self.get_total_used_memory());
    }
}

use wgpu::util::DeviceExt;

use crate::{
    data_structures::instance::{Instance, InstanceRaw},
    resources::registry::ResourceHandle,
};

/// Instance buffer of one scene resource.
///
/// The buffer is rewritten in place every frame and only reallocated when
/// the number of instances grows past its capacity.
#[derive(Debug)]
pub struct InstanceBatch {
    pub handle: ResourceHandle,
    pub buffer: wgpu::Buffer,
    capacity: usize,
    amount: usize,
    scratch: Vec<InstanceRaw>,
}

impl InstanceBatch {
    pub fn new(device: &wgpu::Device, handle: ResourceHandle, instances: &[Instance]) -> Self {
        let scratch: Vec<InstanceRaw> = instances.iter().map(Instance::to_raw).collect();
        let buffer = create_buffer(device, handle, &scratch);
        Self {
            handle,
            buffer,
            capacity: scratch.len().max(1),
            amount: scratch.len(),
            scratch,
        }
    }

    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[Instance]) {
        self.scratch.clear();
        self.scratch.extend(instances.iter().map(Instance::to_raw));
        if self.scratch.len() > self.capacity {
            self.buffer.destroy();
            self.buffer = create_buffer(device, self.handle, &self.scratch);
            self.capacity = self.scratch.len();
        } else if !self.scratch.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.scratch));
        }
        self.amount = self.scratch.len();
    }

    pub fn amount(&self) -> usize {
        self.amount
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

fn create_buffer(device: &wgpu::Device, handle: ResourceHandle, raw: &[InstanceRaw]) -> wgpu::Buffer {
    let label = format!("Instance Buffer {}", handle.index());
    if raw.is_empty() {
        // Empty init buffers are not allowed, keep room for one instance.
        return device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
    }
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&label),
        contents: bytemuck::cast_slice(raw),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

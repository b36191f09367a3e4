use wgpu::util::DeviceExt;

use crate::config::hex_to_linear;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Ambient, one directional sun, one point light and linear fog.
///
/// Colours are linear RGB pre-multiplied by their intensity.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    /// Unit vector pointing from the scene towards the sun.
    pub sun_direction: [f32; 3],
    _padding2: u32,
    pub sun_color: [f32; 3],
    _padding3: u32,
    pub point_position: [f32; 3],
    /// Distance at which the point light has faded out completely.
    pub point_range: f32,
    pub point_color: [f32; 3],
    _padding4: u32,
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    _padding5: [u32; 3],
}

impl LightUniform {
    /// White ambient, a warm gold sun from the upper right and a magenta
    /// glow behind the bouquet, fading into `fog_color`.
    pub fn garden(fog_color: [f32; 3]) -> Self {
        Self {
            ambient: scaled(hex_to_linear(0xffffff), 0.3),
            _padding: 0,
            sun_direction: normalize([10.0, 20.0, 10.0]),
            _padding2: 0,
            sun_color: scaled(hex_to_linear(0xffd700), 1.2),
            _padding3: 0,
            point_position: [0.0, 15.0, -10.0],
            point_range: 60.0,
            point_color: scaled(hex_to_linear(0xff00cc), 3.0),
            _padding4: 0,
            fog_color,
            fog_near: 15.0,
            fog_far: 90.0,
            _padding5: [0; 3],
        }
    }
}

fn scaled(c: [f32; 3], intensity: f32) -> [f32; 3] {
    [c[0] * intensity, c[1] * intensity, c[2] * intensity]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_the_shader_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 112);
    }

    #[test]
    fn sun_direction_is_normalised() {
        let light = LightUniform::garden([0.0; 3]);
        let d = light.sun_direction;
        assert!(((d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() - 1.0).abs() < 1e-6);
        assert!(light.fog_near < light.fog_far);
    }
}

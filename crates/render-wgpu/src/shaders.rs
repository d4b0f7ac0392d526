/// WGSL shader for physically based meshes: metallic-roughness with a
/// clearcoat lobe, point and spot lights, hemisphere fill and tone mapping.
pub const PBR_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 16u;
const PI: f32 = 3.14159265;

struct Light {
    position: vec4<f32>,
    color: vec4<f32>,
    direction: vec4<f32>,
    params: vec4<f32>,
};

struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    flags: vec4<u32>,
    exposure: vec4<f32>,
    lights: array<Light, 16>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    base_color: vec4<f32>,
    surface: vec4<f32>,
    extra: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> object: Object;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (object.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

fn d_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn v_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let gv = n_dot_l * sqrt(n_dot_v * n_dot_v * (1.0 - a * a) + a * a);
    let gl = n_dot_v * sqrt(n_dot_l * n_dot_l * (1.0 - a * a) + a * a);
    return 0.5 / max(gv + gl, 1e-5);
}

fn f_schlick(f0: vec3<f32>, v_dot_h: f32) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - v_dot_h, 5.0);
}

fn distance_attenuation(dist: f32, cutoff: f32, decay: f32) -> f32 {
    if globals.flags.z == 1u {
        var falloff = 1.0 / max(pow(dist, decay), 0.01);
        if cutoff > 0.0 {
            let r = dist / cutoff;
            let s = clamp(1.0 - r * r * r * r, 0.0, 1.0);
            falloff = falloff * s * s;
        }
        return falloff;
    }
    if cutoff > 0.0 && decay > 0.0 {
        return pow(clamp(1.0 - dist / cutoff, 0.0, 1.0), decay);
    }
    return 1.0;
}

fn aces_filmic(color: vec3<f32>) -> vec3<f32> {
    let a = color * (color * 2.51 + 0.03);
    let b = color * (color * 2.43 + 0.59) + 0.14;
    return clamp(a / b, vec3<f32>(0.0), vec3<f32>(1.0));
}

fn tone_map(color: vec3<f32>) -> vec3<f32> {
    let exposed = color * globals.exposure.x;
    switch globals.flags.y {
        case 1u: { return clamp(exposed, vec3<f32>(0.0), vec3<f32>(1.0)); }
        case 2u: { return exposed / (vec3<f32>(1.0) + exposed); }
        case 3u: { return aces_filmic(exposed * 0.6); }
        default: { return color; }
    }
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(globals.camera_position.xyz - in.world_position);
    let n_dot_v = max(dot(n, v), 1e-4);

    let base = object.base_color.rgb;
    let metalness = object.surface.x;
    let roughness = max(object.surface.y, 0.045);
    let clearcoat = object.surface.z;
    let coat_roughness = max(object.surface.w, 0.045);
    let reflectivity = object.extra.x;
    let env_intensity = object.extra.y;

    let dielectric_f0 = vec3<f32>(0.16 * reflectivity * reflectivity);
    let f0 = mix(dielectric_f0, base, metalness);
    let diffuse_color = base * (1.0 - metalness);

    var radiance = vec3<f32>(0.0);
    let count = min(globals.flags.x, MAX_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = globals.lights[i];
        let to_light = light.position.xyz - in.world_position;
        let dist = length(to_light);
        let l = to_light / max(dist, 1e-5);
        let n_dot_l = dot(n, l);
        if n_dot_l <= 0.0 {
            continue;
        }
        var attenuation = distance_attenuation(dist, light.params.x, light.params.y);
        if light.position.w > 0.5 {
            let angle_cos = dot(-l, light.direction.xyz);
            attenuation = attenuation * smoothstep(light.direction.w, light.params.z, angle_cos);
        }
        let irradiance = light.color.rgb * light.color.w * attenuation * n_dot_l;

        let h = normalize(l + v);
        let n_dot_h = max(dot(n, h), 0.0);
        let v_dot_h = max(dot(v, h), 0.0);
        let f = f_schlick(f0, v_dot_h);
        let specular = f * d_ggx(n_dot_h, roughness) * v_smith(n_dot_v, n_dot_l, roughness);
        let diffuse = (vec3<f32>(1.0) - f) * diffuse_color / PI;

        let coat_f = f_schlick(vec3<f32>(0.04), v_dot_h).x * clearcoat;
        let coat = coat_f * d_ggx(n_dot_h, coat_roughness) * v_smith(n_dot_v, n_dot_l, coat_roughness);

        radiance = radiance + irradiance * ((diffuse + specular) * (1.0 - coat_f) + vec3<f32>(coat));
    }

    // Hemisphere light stands in for an environment map on metals.
    let up = n.y * 0.5 + 0.5;
    let hemi = mix(globals.ground.rgb, globals.sky.rgb, up) * globals.sky.w;
    let r = reflect(-v, n);
    let env = mix(globals.ground.rgb, globals.sky.rgb, r.y * 0.5 + 0.5) * globals.sky.w;
    let env_f = f_schlick(f0, n_dot_v) * (1.0 - roughness * 0.5);
    radiance = radiance + (globals.ambient.rgb + hemi) * diffuse_color;
    radiance = radiance + env * env_f * env_intensity;

    return vec4<f32>(tone_map(radiance), 1.0);
}
"#;

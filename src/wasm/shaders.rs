/// Shared vertex stage: world-space position/normal for lighting, view-space
/// normal for the normal material.
pub const MESH_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_model;
uniform mat3 u_normal_matrix;
uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_pos;
out vec3 v_world_normal;
out vec3 v_view_normal;
out vec2 v_uv;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world_pos = world.xyz;
    v_world_normal = normalize(u_normal_matrix * a_normal);
    v_view_normal = normalize(mat3(u_view) * v_world_normal);
    v_uv = a_uv;
    gl_Position = u_projection * u_view * world;
}
"#;

/// Metal/roughness shading with one ambient term, one spot light, an optional
/// reflective cube map and an optional alpha map (green channel).
pub const STANDARD_FRAG: &str = r#"#version 300 es
precision highp float;

const float PI = 3.141592653589793;

in vec3 v_world_pos;
in vec3 v_world_normal;
in vec2 v_uv;

uniform vec3 u_color;
uniform float u_metalness;
uniform float u_roughness;
uniform bool u_double_sided;
uniform vec3 u_camera_pos;

uniform vec3 u_ambient;

uniform bool u_has_spot;
uniform vec3 u_spot_pos;
uniform vec3 u_spot_dir;
uniform vec3 u_spot_color;
uniform float u_spot_distance;
uniform float u_spot_decay;
uniform float u_spot_cos_outer;
uniform float u_spot_cos_inner;

uniform bool u_has_env;
uniform samplerCube u_env;
uniform float u_env_intensity;

uniform bool u_has_alpha;
uniform sampler2D u_alpha;

out vec4 frag_color;

float distance_falloff(float d) {
    float falloff = 1.0 / max(pow(d, u_spot_decay), 0.01);
    if (u_spot_distance > 0.0) {
        float r = clamp(d / u_spot_distance, 0.0, 1.0);
        float w = clamp(1.0 - r * r * r * r, 0.0, 1.0);
        falloff *= w * w;
    }
    return falloff;
}

vec3 fresnel(vec3 f0, float cos_theta) {
    return f0 + (1.0 - f0) * pow(1.0 - clamp(cos_theta, 0.0, 1.0), 5.0);
}

void main() {
    vec3 n = normalize(v_world_normal);
    if (u_double_sided && !gl_FrontFacing) {
        n = -n;
    }
    vec3 v = normalize(u_camera_pos - v_world_pos);

    vec3 base = pow(u_color, vec3(2.2));
    vec3 diffuse = base * (1.0 - u_metalness);
    vec3 f0 = mix(vec3(0.04), base, u_metalness);

    vec3 color = u_ambient * diffuse;

    if (u_has_spot) {
        vec3 to_light = u_spot_pos - v_world_pos;
        float d = length(to_light);
        vec3 l = to_light / d;
        float cone = smoothstep(u_spot_cos_outer, u_spot_cos_inner, dot(-l, u_spot_dir));
        float ndl = max(dot(n, l), 0.0);
        vec3 radiance = u_spot_color * distance_falloff(d) * cone * ndl;

        vec3 h = normalize(l + v);
        float shininess = mix(2048.0, 2.0, clamp(u_roughness, 0.0, 1.0));
        float specular = pow(max(dot(n, h), 0.0), shininess) * (shininess + 2.0) / (8.0 * PI);
        color += radiance * (diffuse / PI + fresnel(f0, dot(h, v)) * specular);
    }

    if (u_has_env) {
        vec3 r = reflect(-v, n);
        vec3 env = pow(texture(u_env, vec3(-r.x, r.yz)).rgb, vec3(2.2));
        color += env * fresnel(f0, dot(n, v)) * u_env_intensity;
    }

    float alpha = u_has_alpha ? texture(u_alpha, v_uv).g : 1.0;
    frag_color = vec4(pow(clamp(color, 0.0, 1.0), vec3(1.0 / 2.2)), alpha);
}
"#;

/// View-space normal packed into RGB.
pub const NORMAL_FRAG: &str = r#"#version 300 es
precision highp float;

in vec3 v_view_normal;

uniform bool u_double_sided;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_view_normal);
    if (u_double_sided && !gl_FrontFacing) {
        n = -n;
    }
    frag_color = vec4(n * 0.5 + 0.5, 1.0);
}
"#;

#![cfg(feature = "integration-tests")]

use glow::HasContext;

use cubegl::engine::components::{ DecodedImage, Texture };
use cubegl::engine::config::AppConfig;
use cubegl::engine::platform::Surface;
use cubegl::Scene;

fn read_pixel(gl: &glow::Context, x: i32, y: i32) -> [u8; 4] {
    let mut pixel = [0u8; 4];
    unsafe {
        gl.read_pixels(x, y, 1, 1, glow::RGBA, glow::UNSIGNED_BYTE, glow::PixelPackData::Slice(Some(&mut pixel[..])));
    }
    pixel
}

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Pixels from the centre of the 800x800 frame into each quadrant of the
/// front face, which spans roughly 138 pixels either side at t = 0.
const QUADRANT_OFFSET: i32 = 40;

// winit allows one event loop per process, so everything runs in a single test.
#[test]
fn front_face_samples_each_texel_in_its_quadrant() {
    let config = AppConfig::default();
    let mut surface = Surface::init(&config.window).expect("surface init");
    let gl = surface.gl();

    // first row is t = 0, which lands at the bottom of the face
    let texels = DecodedImage { width: 2, height: 2, channels: 4, pixels: [RED, GREEN, BLUE, WHITE].concat() };
    let mut scene = Scene::with_texture(gl.clone(), &config, |gl| Texture::from_image(gl, &texels)).expect("scene");

    let mvp = scene.update(0.0);
    surface.clear();
    scene.draw(&mvp);

    let (width, height) = surface.size();
    let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
    let d = QUADRANT_OFFSET;
    for (x, y, expected, quadrant) in [
        (cx - d, cy - d, RED, "bottom left"),
        (cx + d, cy - d, GREEN, "bottom right"),
        (cx - d, cy + d, BLUE, "top left"),
        (cx + d, cy + d, WHITE, "top right"),
    ] {
        let pixel = read_pixel(&gl, x, y);
        assert_eq!(&pixel[..3], &expected[..3], "{quadrant} pixel {pixel:?}");
    }

    let corner = read_pixel(&gl, 2, 2);
    assert_eq!(&corner[..3], &[0, 0, 0], "corner pixel {corner:?}");

    surface.swap().expect("swap");
    surface.poll();

    scene.cleanup();
    drop(scene);
    assert!(!surface.should_close());
}

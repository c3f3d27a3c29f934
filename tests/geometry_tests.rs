// tests/geometry_tests.rs

use macroquad::prelude::vec2;
use macroquad_tiled_platformer::{
    build_static, BatchDescriptor, ConfigIssue, IrLayer, IrTileset, Level, TextureId, TextureTable, TileGrid,
};

fn tileset(first_gid: u32, image: &str) -> IrTileset {
    IrTileset {
        first_gid,
        image: image.to_owned(),
        image_w: 64,
        image_h: 64,
        tile_w: 32,
        tile_h: 32,
        columns: 2,
        tilecount: 4,
        spacing: 0,
        margin: 0,
    }
}

/// sky (image) / ground (two tilesets) / collision / deco (one unresolved gid)
fn village() -> Level {
    Level {
        width: 2,
        height: 2,
        tile_w: 32,
        tile_h: 32,
        tilesets: vec![tileset(1, "tiles.png"), tileset(5, "props.png")],
        layers: vec![
            IrLayer::image("sky", "sky.png", 320, 180, vec2(-10.0, 4.0)),
            IrLayer::tiles("ground", 2, 2, vec![1, 5, 0x8000_0006, 0]),
            IrLayer::tiles("collision", 2, 2, vec![1, 1, 1, 1]),
            IrLayer::tiles("deco", 2, 2, vec![2, 0, 99, 0]),
        ],
    }
}

fn textures() -> TextureTable {
    let mut t = TextureTable::new();
    t.insert("tiles.png", TextureId(0));
    t.insert("props.png", TextureId(1));
    t.insert("sky.png", TextureId(2));
    t
}

fn grid(level: Level) -> TileGrid {
    TileGrid::from_level(level, "collision").expect("valid level")
}

#[test]
fn one_batch_per_tileset_per_layer_back_to_front() {
    let build = build_static(&grid(village()), &textures());
    let geo = &build.geometry;

    assert_eq!(
        geo.batches(),
        &[
            BatchDescriptor { texture: TextureId(2), vertex_offset: 0, vertex_count: 6 },
            BatchDescriptor { texture: TextureId(0), vertex_offset: 6, vertex_count: 6 },
            BatchDescriptor { texture: TextureId(1), vertex_offset: 12, vertex_count: 12 },
            BatchDescriptor { texture: TextureId(0), vertex_offset: 24, vertex_count: 6 },
        ]
    );
    assert_eq!(geo.vertices().len(), 30);

    let z_of = |b: &BatchDescriptor| geo.vertices()[b.vertex_offset].position[2];
    let zs: Vec<f32> = geo.batches().iter().map(z_of).collect();
    assert_eq!(zs, vec![1.0, 0.75, 0.75, 0.25]);
    assert!(
        geo.vertices().iter().all(|v| v.position[2] != 0.5),
        "collision layer is never drawn"
    );
}

#[test]
fn quads_sit_on_the_grid_and_image_layer_uses_its_offset() {
    let build = build_static(&grid(village()), &textures());
    let v = build.geometry.vertices();

    // sky: full texture stretched over its pixel size
    assert_eq!(v[0].position, [-10.0, 4.0, 1.0]);
    assert_eq!(v[0].uv, [0.0, 0.0]);
    assert_eq!(v[2].position, [310.0, 184.0, 1.0]);
    assert_eq!(v[2].uv, [1.0, 1.0]);

    // ground cell 2 (row 1, col 0) holds local tile 1 of props.png, mirrored
    let flipped = &v[18..24];
    assert_eq!(flipped[0].position, [0.0, 32.0, 0.75]);
    assert_eq!(flipped[2].position, [32.0, 64.0, 0.75]);
    assert_eq!(flipped[0].uv, [1.0, 0.0]);
    assert_eq!(flipped[2].uv, [0.5, 0.5]);

    // unflipped neighbour keeps u increasing left to right
    let plain = &v[12..18];
    assert_eq!(plain[0].uv, [0.0, 0.0]);
    assert_eq!(plain[2].uv, [0.5, 0.5]);
}

#[test]
fn unresolved_tiles_are_skipped_and_reported_once() {
    let mut level = village();
    level.layers[3] = IrLayer::tiles("deco", 2, 2, vec![2, 99, 99, 0]);
    let build = build_static(&grid(level), &textures());

    assert_eq!(
        build.issues,
        vec![
            ConfigIssue::UnresolvedTile { layer: "deco".to_owned(), index: 1, gid: 99 },
            ConfigIssue::UnresolvedTile { layer: "deco".to_owned(), index: 2, gid: 99 },
        ]
    );
    assert_eq!(build.geometry.batches().last().map(|b| b.vertex_count), Some(6));
}

#[test]
fn ids_past_an_uncounted_tileset_are_reported_not_drawn() {
    let mut ts = tileset(1, "tiles.png");
    ts.tilecount = 0;
    let level = Level {
        width: 3,
        height: 1,
        tile_w: 32,
        tile_h: 32,
        tilesets: vec![ts],
        layers: vec![IrLayer::tiles("ground", 3, 1, vec![4, 0x1FFF_FFFF, 0x1000_0000])],
    };
    let build = build_static(&grid(level), &textures());

    assert_eq!(
        build.geometry.batches(),
        &[BatchDescriptor { texture: TextureId(0), vertex_offset: 0, vertex_count: 6 }]
    );
    assert!(build
        .geometry
        .vertices()
        .iter()
        .all(|v| (0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1])));
    assert_eq!(
        build.issues,
        vec![
            ConfigIssue::UnresolvedTile { layer: "ground".to_owned(), index: 1, gid: 0x1FFF_FFFF },
            ConfigIssue::UnresolvedTile { layer: "ground".to_owned(), index: 2, gid: 0x1000_0000 },
        ]
    );
}

#[test]
fn missing_texture_skips_batch() {
    let mut t = TextureTable::new();
    t.insert("tiles.png", TextureId(0));
    let build = build_static(&grid(village()), &t);

    assert!(build.issues.contains(&ConfigIssue::MissingTexture("sky.png".to_owned())));
    assert!(build.issues.contains(&ConfigIssue::MissingTexture("props.png".to_owned())));
    assert!(build.geometry.batches().iter().all(|b| b.texture == TextureId(0)));
    assert_eq!(build.geometry.vertices().len(), 12);
}

#[test]
fn invisible_layer_keeps_depth_slot() {
    let mut level = village();
    level.layers[1].visible = false;
    let build = build_static(&grid(level), &textures());
    let geo = &build.geometry;

    let zs: Vec<f32> = geo
        .batches()
        .iter()
        .map(|b| geo.vertices()[b.vertex_offset].position[2])
        .collect();
    assert_eq!(zs, vec![1.0, 0.25]);
}

#[test]
fn rebuilding_is_byte_identical() {
    let g = grid(village());
    let a = build_static(&g, &textures());
    let b = build_static(&g, &textures());

    assert_eq!(a.geometry.vertex_bytes(), b.geometry.vertex_bytes());
    assert_eq!(a.geometry.batches(), b.geometry.batches());
    assert_eq!(a.geometry.vertex_bytes().len(), 30 * 5 * 4);
}

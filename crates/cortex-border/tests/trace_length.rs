//! End-to-end tests combining projection, tracing, and length
//! measurement on small synthetic meshes.

use approx::assert_abs_diff_eq;
use cortex_border::{Border, BorderLengthMeasurer, BorderSet, BorderTracer};
use cortex_math::Point3;
use cortex_proj::{SurfaceProjection, SurfaceProjector};
use cortex_surface::{SurfaceMesh, SurfaceShape, TopologyHelper};

/// A 5x5 unit grid in the XY plane, cells split along the
/// lower-left/upper-right diagonal.
fn flat_grid() -> SurfaceMesh {
    let n = 5usize;
    let mut coords = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            coords.push(Point3::new(x as f64, y as f64, 0.0));
        }
    }
    let mut triangles = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let a = y * n + x;
            let b = a + 1;
            let c = a + n;
            let d = c + 1;
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }
    SurfaceMesh::new(coords, triangles).unwrap()
}

fn octahedron() -> SurfaceMesh {
    SurfaceMesh::new(
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ],
        vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ],
    )
    .unwrap()
}

#[test]
fn traced_border_measures_its_polyline_length() {
    // Cut the grid between columns 1 and 2, trace the cut, and check
    // the measured length against the unprojected polyline.
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let tracer = BorderTracer::new(&mesh, &topo);
    let borders = tracer.trace("cut", |n| n % 5 < 2).unwrap();
    assert_eq!(borders.len(), 1);
    let border = &borders[0];
    assert!(!border.closed);

    let coords: Vec<Point3> = border
        .points
        .iter()
        .map(|p| p.unproject(&mesh).unwrap())
        .collect();
    let mut expected = 0.0;
    for pair in coords.windows(2) {
        expected += (pair[1] - pair[0]).norm();
    }

    let measurer = BorderLengthMeasurer::new(&mesh, &topo);
    let len = measurer.length(border).unwrap();
    // Consecutive traced points sit in triangles sharing two or three
    // vertices on a flat mesh, so the unfold is exact.
    assert_abs_diff_eq!(len, expected, epsilon = 1e-9);
    assert!(len > 0.0);
}

#[test]
fn closed_trace_includes_wrap_segment() {
    // An interior island around a single grid vertex produces a closed
    // hexagonal ring; its length must include the wrap-around segment.
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let tracer = BorderTracer::new(&mesh, &topo);
    let borders = tracer.trace("island", |n| n == 12).unwrap();
    assert_eq!(borders.len(), 1);
    let border = &borders[0];
    assert!(border.closed);
    assert_eq!(border.len(), 6);

    let measurer = BorderLengthMeasurer::new(&mesh, &topo);
    let closed_len = measurer.length(border).unwrap();

    let mut open = border.clone();
    open.closed = false;
    let open_len = measurer.length(&open).unwrap();
    assert!(closed_len > open_len);

    // Dropping the flag and re-adding the wrap segment by hand agrees
    let mut wrapped = open.clone();
    wrapped.points.push(border.points[0].clone());
    assert_abs_diff_eq!(
        measurer.length(&wrapped).unwrap(),
        closed_len,
        epsilon = 1e-9
    );
}

#[test]
fn projected_points_round_trip_through_border() {
    // Project free points onto the octahedron, store them in a border,
    // and unproject: each must land back on the surface triangle.
    let mesh = octahedron();
    let topo = TopologyHelper::new(&mesh);
    let projector = SurfaceProjector::new(&mesh, &topo).surface_shape(SurfaceShape::Sphere);

    let queries = vec![
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(-0.2, 0.4, 0.6),
        Point3::new(0.1, -0.7, 0.3),
    ];
    let mut border = Border::new("roundtrip");
    for q in &queries {
        border.push_point(projector.project(q).unwrap());
    }

    for (p, q) in border.points.iter().zip(&queries) {
        assert!(p.is_valid());
        let on_surface = p.unproject(&mesh).unwrap();
        // Every octahedron face lies in a plane |x| + |y| + |z| = 1
        let plane = on_surface.x.abs() + on_surface.y.abs() + on_surface.z.abs();
        assert_abs_diff_eq!(plane, 1.0, epsilon = 1e-9);
        // The projection stays near the radially scaled query
        let scaled = Point3::from(q.coords.normalize());
        assert!((on_surface - scaled).norm() < 0.5);
    }

    let measurer = BorderLengthMeasurer::new(&mesh, &topo);
    assert!(measurer.length(&border).unwrap() > 0.0);
}

#[test]
fn retracing_is_deterministic() {
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let tracer = BorderTracer::new(&mesh, &topo);

    let first = tracer.trace("region", |n| n / 5 < 2 || n == 13).unwrap();
    let second = tracer.trace("region", |n| n / 5 < 2 || n == 13).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.closed, b.closed);
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.points.iter().zip(&b.points) {
            let xa = pa.unproject(&mesh).unwrap();
            let xb = pb.unproject(&mesh).unwrap();
            assert_abs_diff_eq!((xa - xb).norm(), 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn border_set_groups_traced_pieces() {
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let tracer = BorderTracer::new(&mesh, &topo);

    // Two disjoint islands produce two closed pieces under one class
    let borders = tracer.trace("islands", |n| n == 6 || n == 18).unwrap();
    assert_eq!(borders.len(), 2);

    let mut set = BorderSet::new();
    for b in borders {
        assert_eq!(b.class_name, "islands");
        set.add_border(b);
    }
    let groups = set.grouped_by_name();
    assert_eq!(groups.len(), 2);
    for (_, indices) in &groups {
        assert_eq!(indices.len(), 1);
    }
}

#[test]
fn serialized_border_survives_json_round_trip() {
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let tracer = BorderTracer::new(&mesh, &topo);
    let borders = tracer.trace("cut", |n| n % 5 < 2).unwrap();
    let border = &borders[0];

    let json = serde_json::to_string(border).unwrap();
    let back: Border = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, border.name);
    assert_eq!(back.closed, border.closed);
    assert_eq!(back.len(), border.len());

    let measurer = BorderLengthMeasurer::new(&mesh, &topo);
    assert_abs_diff_eq!(
        measurer.length(&back).unwrap(),
        measurer.length(border).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn barycentric_projection_serializes_with_tag() {
    let mesh = flat_grid();
    let topo = TopologyHelper::new(&mesh);
    let projector = SurfaceProjector::new(&mesh, &topo).surface_shape(SurfaceShape::Flat);
    let p = projector.project(&Point3::new(1.3, 2.4, 0.0)).unwrap();
    let json = serde_json::to_string(&p).unwrap();
    assert!(json.contains("\"type\":\"Barycentric\""));
    let back: SurfaceProjection = serde_json::from_str(&json).unwrap();
    let x = back.unproject(&mesh).unwrap();
    assert_abs_diff_eq!(x.x, 1.3, epsilon = 1e-9);
    assert_abs_diff_eq!(x.y, 2.4, epsilon = 1e-9);
}

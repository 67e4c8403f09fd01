use rigshift_core::{build_humanoid, cycle::resolve_roles, Mesh, RigError, Skeleton};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

/// A 2 m tall box standing on z = 0.5, centred on (1, -1).
fn tall_box() -> Mesh {
    let mut verts = Vec::new();
    for x in [0.7, 1.3] {
        for y in [-1.2, -0.8] {
            for z in [0.5, 2.5] {
                verts.push([x, y, z]);
            }
        }
    }
    Mesh::new("Body", verts)
}

fn head(sk: &Skeleton, name: &str) -> [f32; 3] {
    sk.bone(sk.index_of(name).unwrap()).unwrap().head
}

fn tail(sk: &Skeleton, name: &str) -> [f32; 3] {
    sk.bone(sk.index_of(name).unwrap()).unwrap().tail
}

#[test]
fn humanoid_has_the_full_named_bone_set() {
    let sk = build_humanoid(&tall_box()).unwrap();
    assert_eq!(sk.name, "AutoRig_Armature");
    let mut expected = vec!["Hips", "Spine", "Chest", "Neck", "Head"];
    let sided = ["UpLeg", "Leg", "Foot", "Shoulder", "Arm", "ForeArm", "Hand"];
    let names: Vec<String> = ["Left", "Right"]
        .iter()
        .flat_map(|side| sided.iter().map(move |part| format!("{side}{part}")))
        .collect();
    expected.extend(names.iter().map(String::as_str));
    assert_eq!(sk.len(), expected.len());
    for name in expected {
        assert!(sk.contains(name), "missing {name}");
    }
    assert_eq!(sk.roots().map(|b| b.name.as_str()).collect::<Vec<_>>(), ["Hips"]);
}

#[test]
fn bones_chain_from_the_hips() {
    let sk = build_humanoid(&tall_box()).unwrap();
    let parent = |name: &str| {
        let bone = sk.bone(sk.index_of(name).unwrap()).unwrap();
        bone.parent.map(|p| sk.bone(p).unwrap().name.clone())
    };
    assert_eq!(parent("Head").as_deref(), Some("Neck"));
    assert_eq!(parent("Neck").as_deref(), Some("Chest"));
    assert_eq!(parent("LeftUpLeg").as_deref(), Some("Hips"));
    assert_eq!(parent("RightFoot").as_deref(), Some("RightLeg"));
    assert_eq!(parent("LeftShoulder").as_deref(), Some("Chest"));
    assert_eq!(parent("RightHand").as_deref(), Some("RightForeArm"));
}

#[test]
fn joints_sit_at_fixed_fractions_of_the_height() {
    let sk = build_humanoid(&tall_box()).unwrap();
    let (floor, height) = (0.5, 2.0);
    let frac = |z: f32| (z - floor) / height;

    assert!(approx(frac(head(&sk, "Hips")[2]), 0.5, 1e-5));
    assert!(approx(frac(head(&sk, "Spine")[2]), 0.6, 1e-5));
    assert!(approx(frac(head(&sk, "Chest")[2]), 0.75, 1e-5));
    assert!(approx(frac(head(&sk, "Neck")[2]), 0.85, 1e-5));
    assert!(approx(frac(head(&sk, "Head")[2]), 0.95, 1e-5));
    assert!(approx(tail(&sk, "Head")[2], 2.5, 1e-5));
    assert!(approx(frac(head(&sk, "LeftLeg")[2]), 0.25, 1e-5));
    assert!(approx(frac(head(&sk, "LeftFoot")[2]), 0.05, 1e-5));

    // Centred on the bounding box.
    let hips = head(&sk, "Hips");
    assert!(approx(hips[0], 1.0, 1e-5) && approx(hips[1], -1.0, 1e-5));

    // Legs 0.08 h either side, feet pointing 0.1 h down -Y.
    assert!(approx(head(&sk, "LeftUpLeg")[0] - 1.0, 0.16, 1e-5));
    assert!(approx(head(&sk, "RightUpLeg")[0] - 1.0, -0.16, 1e-5));
    assert!(approx(tail(&sk, "LeftFoot")[1] - hips[1], -0.2, 1e-5));

    // Hands end 2.2 shoulder widths (0.15 h) out, level with the chest.
    let hand = tail(&sk, "LeftHand");
    assert!(approx(hand[0] - 1.0, 0.66, 1e-5));
    assert!(approx(frac(hand[2]), 0.75, 1e-5));
    assert!(approx(tail(&sk, "RightHand")[0] - 1.0, -0.66, 1e-5));
}

#[test]
fn generated_rig_is_ready_for_a_sprint() {
    let sk = build_humanoid(&tall_box()).unwrap();
    assert_eq!(resolve_roles(&sk).len(), 10);
}

#[test]
fn mesh_without_vertices_cannot_be_rigged() {
    let err = build_humanoid(&Mesh::new("Empty", Vec::new())).unwrap_err();
    assert!(matches!(err, RigError::Binding { ref mesh, .. } if mesh == "Empty"));
}

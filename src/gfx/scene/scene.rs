use std::collections::HashMap;
use std::fmt;

use super::light::Light;
use super::mesh::Mesh;
use super::object::Object3D;
use crate::gfx::resources::{Material, MaterialLibrary};
use crate::loaders::ImportedModel;
use crate::math::Matrix4;

/// Handle to a node stored in a [`Scene`].
///
/// Ids are generational: once a node is removed its id stops resolving, even
/// if the slot is later reused by another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Ordered child list of a grouping node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    children: Vec<NodeId>,
}

impl Container {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Container(Container),
}

/// A scene-graph node: transform state plus either geometry or children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub object: Object3D,
    pub kind: NodeKind,
    parent: Option<NodeId>,
}

impl Node {
    pub fn name(&self) -> Option<&str> {
        self.object.name()
    }

    /// `None` only for the scene root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Container(_) => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Container(_) => None,
        }
    }

    /// Children in insertion order; empty for meshes.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Container(container) => container.children(),
            NodeKind::Mesh(_) => &[],
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// One step of a depth-first walk: the node, its id, its depth below the
/// root and its world matrix (`parent_world * model`).
#[derive(Debug)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub world: Matrix4,
    pub depth: usize,
}

/// Pre-order walk over the scene graph, children in insertion order.
pub struct DepthFirst<'a> {
    scene: &'a Scene,
    stack: Vec<(NodeId, Matrix4, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Visit<'a>> {
        loop {
            let (id, parent_world, depth) = self.stack.pop()?;
            let Some(node) = self.scene.node(id) else {
                continue;
            };
            let world = parent_world * node.object.model_matrix;
            for &child in node.children().iter().rev() {
                self.stack.push((child, world, depth + 1));
            }
            return Some(Visit {
                id,
                node,
                world,
                depth,
            });
        }
    }
}

/// Root of a scene graph plus the lights and materials it is drawn with.
///
/// Nodes live in an arena owned by the scene. Containers list their children
/// by [`NodeId`] and every node records its parent, so a node belongs to at
/// most one container and the hierarchy cannot form cycles.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    lights: Vec<Light>,
    materials: MaterialLibrary,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let root_node = Node {
            object: Object3D::named("scene"),
            kind: NodeKind::Container(Container::default()),
            parent: None,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root_node),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            lights: Vec::new(),
            materials: MaterialLibrary::new(),
        }
    }

    /// The top-level container. It always exists and cannot be removed.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn object(&self, id: NodeId) -> Option<&Object3D> {
        self.node(id).map(|node| &node.object)
    }

    pub fn object_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.node_mut(id).map(|node| &mut node.object)
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        self.node(id).and_then(Node::as_mesh)
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        self.node_mut(id).and_then(Node::as_mesh_mut)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children of `id` in insertion order. Empty for meshes and stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_children().is_empty()
    }

    fn root_children(&self) -> &[NodeId] {
        self.children(self.root)
    }

    /// Appends a mesh node to `parent`'s children.
    ///
    /// # Panics
    /// Panics if `parent` is not a live container.
    pub fn add_mesh(&mut self, parent: NodeId, object: Object3D, mesh: Mesh) -> NodeId {
        self.insert(parent, object, NodeKind::Mesh(mesh))
    }

    /// Appends an empty container node to `parent`'s children.
    ///
    /// # Panics
    /// Panics if `parent` is not a live container.
    pub fn add_container(&mut self, parent: NodeId, object: Object3D) -> NodeId {
        self.insert(parent, object, NodeKind::Container(Container::default()))
    }

    fn insert(&mut self, parent: NodeId, object: Object3D, kind: NodeKind) -> NodeId {
        match self.node(parent).map(Node::is_container) {
            Some(true) => {}
            Some(false) => panic!("node {} is a mesh and cannot hold children", parent),
            None => panic!("parent node {} is not part of this scene", parent),
        }

        let node = Node {
            object,
            kind,
            parent: Some(parent),
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        if let Some(Node {
            kind: NodeKind::Container(container),
            ..
        }) = self.node_mut(parent)
        {
            container.children.push(id);
        }
        id
    }

    /// Detaches `id` from its parent and drops it together with all of its
    /// descendants. Returns the ids that stopped resolving, in pre-order.
    ///
    /// The root cannot be removed; asking for it (or for a stale id) removes
    /// nothing.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root {
            log::warn!("The scene root cannot be removed");
            return Vec::new();
        }
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };

        if let Some(Node {
            kind: NodeKind::Container(container),
            ..
        }) = self.node_mut(parent)
        {
            container.children.retain(|&child| child != id);
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                pending.extend(node.children().iter().rev());
                removed.push(current);
            }
        }
        log::debug!("Removed {} node(s) starting at {}", removed.len(), id);
        removed
    }

    /// Position of `child` in `parent`'s child list.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Depth-first search from the root for the first node named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.find_by_name_in(self.root, name)
    }

    /// Depth-first search of the subtree rooted at `start`, including `start`.
    pub fn find_by_name_in(&self, start: NodeId, name: &str) -> Option<NodeId> {
        self.depth_first_from(start)
            .find(|visit| visit.node.name() == Some(name))
            .map(|visit| visit.id)
    }

    pub fn depth_first(&self) -> DepthFirst<'_> {
        self.depth_first_from(self.root)
    }

    /// Walks the subtree at `start`. World matrices are composed with the
    /// ancestors of `start` as well.
    pub fn depth_first_from(&self, start: NodeId) -> DepthFirst<'_> {
        let parent_world = self
            .parent(start)
            .and_then(|parent| self.world_matrix(parent))
            .unwrap_or(Matrix4::IDENTITY);
        let stack = if self.contains(start) {
            vec![(start, parent_world, 0)]
        } else {
            Vec::new()
        };
        DepthFirst { scene: self, stack }
    }

    /// The product of every model matrix from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4> {
        let mut node = self.node(id)?;
        let mut world = node.object.model_matrix;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            world.premultiply(&node.object.model_matrix);
        }
        Some(world)
    }

    /// Mesh nodes in draw order with their world matrices.
    pub(crate) fn mesh_draw_list(&self) -> Vec<(NodeId, Matrix4)> {
        self.depth_first()
            .filter(|visit| visit.node.as_mesh().is_some())
            .map(|visit| (visit.id, visit.world))
            .collect()
    }

    /// Attaches an imported model under `parent` as a new container holding
    /// one mesh node per imported mesh, and merges its materials into the
    /// scene library.
    ///
    /// Material names are only unique within one import. A material whose
    /// name is already taken in the scene is stored as
    /// `"<container>/<name>"` and the imported meshes are pointed at the new
    /// name.
    pub fn add_model(&mut self, parent: NodeId, name: &str, model: ImportedModel) -> NodeId {
        let container_name = self.ensure_unique_name(name);

        let mut renamed: HashMap<String, String> = HashMap::new();
        for mut material in model.materials {
            let original = material.name().to_string();
            if self.materials.contains(&original) {
                let scoped = self.unique_material_name(&format!("{}/{}", container_name, original));
                log::debug!("Material '{}' already in scene, stored as '{}'", original, scoped);
                material.properties_mut().name = scoped.clone();
                renamed.insert(original, scoped);
            }
            self.materials.add(material);
        }

        let container = self.add_container(parent, Object3D::named(container_name));
        for imported in model.meshes {
            let object = match imported.name {
                Some(name) => Object3D::named(name),
                None => Object3D::new(),
            };
            let mut mesh = imported.mesh;
            if let Some(scoped) = mesh.material().and_then(|id| renamed.get(id)) {
                mesh.set_material(Some(scoped.clone()));
            }
            self.add_mesh(container, object, mesh);
        }
        container
    }

    fn unique_material_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.materials.contains(&test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }

    /// Returns `desired_name`, suffixed with a counter if a node already uses it.
    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.find_by_name(&test_name).is_some() {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Lights in insertion order. The renderer feeds the first one to the
    /// shader program.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut Vec<Light> {
        &mut self.lights
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> bool {
        self.materials.add(material)
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Resolves the material assigned to a mesh node.
    pub fn material_for(&self, id: NodeId) -> Option<&Material> {
        self.mesh(id)
            .and_then(Mesh::material)
            .and_then(|name| self.materials.get(name))
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let mut stats = SceneStatistics {
            light_count: self.lights.len(),
            material_count: self.materials.len(),
            ..SceneStatistics::default()
        };
        for visit in self.depth_first() {
            match &visit.node.kind {
                NodeKind::Mesh(mesh) => {
                    stats.mesh_count += 1;
                    stats.total_triangles += mesh.triangle_count();
                    stats.total_vertices += mesh.vertex_count();
                }
                NodeKind::Container(_) => stats.container_count += 1,
            }
        }
        stats
    }
}

/// Scene statistics for debugging and logging
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    pub mesh_count: usize,
    pub container_count: usize,
    pub light_count: usize,
    pub material_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::ColorMaterial;
    use crate::gfx::scene::LightColor;
    use crate::loaders::ImportedMesh;
    use crate::math::Vec3;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
    }

    /// root
    /// ├── a (container)
    /// │   ├── a1 (mesh)
    /// │   └── a2 (container)
    /// │       └── deep (mesh)
    /// └── b (mesh)
    fn sample_scene() -> (Scene, [NodeId; 5]) {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_container(root, Object3D::named("a"));
        let a1 = scene.add_mesh(a, Object3D::named("a1"), triangle());
        let a2 = scene.add_container(a, Object3D::named("a2"));
        let deep = scene.add_mesh(a2, Object3D::named("deep"), triangle());
        let b = scene.add_mesh(root, Object3D::named("b"), triangle());
        (scene, [a, a1, a2, deep, b])
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let (scene, [a, a1, a2, _, b]) = sample_scene();
        assert_eq!(scene.children(scene.root()), &[a, b]);
        assert_eq!(scene.children(a), &[a1, a2]);
        assert_eq!(scene.index_of(a, a2), Some(1));
        assert_eq!(scene.parent(a1), Some(a));
        assert_eq!(scene.len(), 6);
    }

    #[test]
    fn test_depth_first_is_preorder() {
        let (scene, _) = sample_scene();
        let names: Vec<_> = scene
            .depth_first()
            .map(|visit| visit.node.name().unwrap_or("").to_string())
            .collect();
        assert_eq!(names, vec!["scene", "a", "a1", "a2", "deep", "b"]);

        let depths: Vec<_> = scene.depth_first().map(|visit| visit.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 3, 1]);
    }

    #[test]
    fn test_find_by_name_searches_nested_containers() {
        let (scene, [a, _, a2, deep, _]) = sample_scene();
        assert_eq!(scene.find_by_name("deep"), Some(deep));
        assert_eq!(scene.find_by_name("a2"), Some(a2));
        assert_eq!(scene.find_by_name_in(a2, "deep"), Some(deep));
        assert_eq!(scene.find_by_name_in(deep, "a"), None);
        assert_eq!(scene.find_by_name("a"), Some(a));
        assert_eq!(scene.find_by_name("nothing"), None);
    }

    #[test]
    fn test_world_matrix_composes_parent_first() {
        let (mut scene, [a, a1, ..]) = sample_scene();
        scene
            .object_mut(a)
            .expect("live")
            .translate(Vec3::new(10.0, 0.0, 0.0));
        scene
            .object_mut(a1)
            .expect("live")
            .scale(Vec3::splat(2.0));

        let world = scene.world_matrix(a1).expect("live");
        let p = world.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(Vec3::new(12.0, 0.0, 0.0), 1e-6));

        let visit = scene
            .depth_first()
            .find(|visit| visit.id == a1)
            .expect("a1 is reachable");
        assert!(visit.world.approx_eq(&world, 1e-6));
    }

    #[test]
    fn test_remove_drops_subtree_and_invalidates_ids() {
        let (mut scene, [a, a1, a2, deep, b]) = sample_scene();
        let removed = scene.remove(a);
        assert_eq!(removed, vec![a, a1, a2, deep]);
        assert_eq!(scene.children(scene.root()), &[b]);
        assert!(!scene.contains(deep));
        assert_eq!(scene.find_by_name("deep"), None);
        assert_eq!(scene.len(), 2);

        // Slots are recycled without resurrecting old ids.
        let fresh = scene.add_mesh(scene.root(), Object3D::named("fresh"), triangle());
        assert!(!scene.contains(a));
        assert_ne!(fresh, a);
        assert!(scene.contains(fresh));
    }

    #[test]
    fn test_remove_root_and_stale_ids_is_a_no_op() {
        let (mut scene, [_, a1, ..]) = sample_scene();
        assert!(scene.remove(scene.root()).is_empty());
        assert_eq!(scene.remove(a1), vec![a1]);
        assert!(scene.remove(a1).is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot hold children")]
    fn test_mesh_cannot_hold_children() {
        let (mut scene, [_, a1, ..]) = sample_scene();
        scene.add_mesh(a1, Object3D::new(), triangle());
    }

    #[test]
    fn test_material_resolution() {
        let mut scene = Scene::new();
        scene.add_material(ColorMaterial::new("red").with_diffuse([1.0, 0.0, 0.0]));
        let painted = scene.add_mesh(scene.root(), Object3D::new(), triangle().with_material("red"));
        let unknown = scene.add_mesh(scene.root(), Object3D::new(), triangle().with_material("blue"));
        let bare = scene.add_mesh(scene.root(), Object3D::new(), triangle());

        assert_eq!(scene.material_for(painted).map(Material::name), Some("red"));
        assert!(scene.material_for(unknown).is_none());
        assert!(scene.material_for(bare).is_none());
    }

    #[test]
    fn test_add_model_builds_container_and_merges_materials() {
        let mut scene = Scene::new();
        let mut materials = MaterialLibrary::new();
        materials.add(ColorMaterial::new("steel"));
        let model = ImportedModel {
            meshes: vec![
                ImportedMesh {
                    name: Some("body".to_string()),
                    mesh: triangle().with_material("steel"),
                },
                ImportedMesh {
                    name: None,
                    mesh: triangle(),
                },
            ],
            materials,
        };

        let first = scene.add_model(scene.root(), "robot", model.clone());
        let second = scene.add_model(scene.root(), "robot", model);
        assert_eq!(scene.children(first).len(), 2);
        assert_eq!(scene.object(second).and_then(Object3D::name), Some("robot (1)"));
        assert_eq!(scene.materials().names(), vec!["steel", "robot (1)/steel"]);

        let body = scene.find_by_name_in(first, "body").expect("mesh is named");
        assert_eq!(scene.material_for(body).map(Material::name), Some("steel"));
        let second_body = scene.find_by_name_in(second, "body").expect("mesh is named");
        assert_eq!(
            scene.material_for(second_body).map(Material::name),
            Some("robot (1)/steel")
        );
    }

    fn model_with_material(material: &str, diffuse: Vec3) -> ImportedModel {
        let mut materials = MaterialLibrary::new();
        materials.add(ColorMaterial::new(material).with_diffuse(diffuse));
        ImportedModel {
            meshes: vec![ImportedMesh {
                name: Some("body".to_string()),
                mesh: triangle().with_material(material),
            }],
            materials,
        }
    }

    #[test]
    fn test_clashing_material_names_stay_with_their_model() {
        let mut scene = Scene::new();
        let red = scene.add_model(scene.root(), "red", model_with_material("Material", Vec3::X));
        let blue = scene.add_model(scene.root(), "blue", model_with_material("Material", Vec3::Z));

        let diffuse_of = |container: NodeId| {
            let body = scene.find_by_name_in(container, "body").expect("mesh is named");
            match scene.material_for(body) {
                Some(Material::Color(color)) => color.diffuse,
                other => panic!("unexpected material: {:?}", other),
            }
        };
        assert_eq!(diffuse_of(red), Some(Vec3::X));
        assert_eq!(diffuse_of(blue), Some(Vec3::Z));
        assert_eq!(scene.materials().len(), 2);
    }

    #[test]
    fn test_statistics() {
        let (mut scene, _) = sample_scene();
        scene.add_light(Light::point(Vec3::new(0.0, 4.0, 0.0), LightColor::default()));
        let stats = scene.get_statistics();
        assert_eq!(stats.mesh_count, 3);
        assert_eq!(stats.container_count, 3);
        assert_eq!(stats.total_triangles, 3);
        assert_eq!(stats.total_vertices, 9);
        assert_eq!(stats.light_count, 1);
    }
}

use laser::*;
use std::error::Error;

pub use serde_json;

/// `None` unless `json_array` holds exactly `D` numbers.
pub fn json_array_to_float_array<const D: usize>(
    json_array: &[serde_json::Value],
) -> Option<[Float; D]> {
    let array: &[serde_json::Value; D] = json_array.try_into().ok()?;

    let mut coords = [0.; D];
    for (coord, value) in coords.iter_mut().zip(array) {
        *coord = value.as_f64()?;
    }
    Some(coords)
}

pub fn json_array_to_point(json_array: &[serde_json::Value]) -> Option<Point> {
    json_array_to_float_array::<2>(json_array).map(Point::from)
}

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &serde_json::Value,
    map: impl FnMut(&serde_json::Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

fn field<'a>(json: &'a serde_json::Value, name: &str) -> Result<&'a serde_json::Value, Box<dyn Error>> {
    json.get(name)
        .ok_or_else(|| format!("missing \"{name}\" field").into())
}

fn float_field(json: &serde_json::Value, name: &str) -> Result<Float, Box<dyn Error>> {
    field(json, name)?
        .as_f64()
        .ok_or_else(|| format!("\"{name}\" must be a number").into())
}

fn point_field(json: &serde_json::Value, name: &str) -> Result<Point, Box<dyn Error>> {
    field(json, name)?
        .as_array()
        .and_then(|array| json_array_to_point(array))
        .ok_or_else(|| format!("\"{name}\" must be an array of 2 numbers").into())
}

/// Missing ids are replaced with fresh ones.
fn id_field(json: &serde_json::Value) -> Result<ObjectId, Box<dyn Error>> {
    match json.get("id") {
        None | Some(serde_json::Value::Null) => Ok(ObjectId::new()),
        Some(id) => Ok(id
            .as_str()
            .ok_or("\"id\" must be a string")?
            .parse::<ObjectId>()?),
    }
}

pub trait JsonType {
    /// Returns a string, unique to the type, naming objects of this type in
    /// messages and in the keys of a scene's JSON representation
    fn json_type() -> String;
}

impl JsonType for Light {
    fn json_type() -> String {
        ObjectKind::Light.to_string()
    }
}

impl<K: PanelKind> JsonType for Panel<K> {
    fn json_type() -> String {
        K::KIND.to_string()
    }
}

impl<T: JsonType> JsonType for [T] {
    fn json_type() -> String {
        format!("[]{}", T::json_type())
    }
}

pub trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

impl JsonSer for Point {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.x, self.y])
    }
}

impl JsonSer for Color {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.rgb())
    }
}

impl JsonSer for Light {
    /// Serialize a light into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`].
    /// Selection is not serialized.
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.to_string(),
            "position": self.position.to_json(),
            "angle": self.angle,
            "color": self.color.to_json(),
        })
    }
}

impl<K> JsonSer for Panel<K> {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.to_string(),
            "position": self.position.to_json(),
            "angle": self.angle,
            "length": self.length,
        })
    }
}

impl JsonSer for Scene {
    fn to_json(&self) -> serde_json::Value {
        let Bounds { width, height } = self.bounds();
        serde_json::json!({
            "width": width,
            "height": height,
            "lights": self.lights().to_json(),
            "mirrors": self.mirrors().to_json(),
            "flags": self.flags().to_json(),
        })
    }
}

impl JsonSer for RaySegment {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start.to_json(),
            "end": self.end.to_json(),
            "color": self.color.to_json(),
        })
    }
}

impl JsonSer for EdgeHit {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "point": self.point.to_json(),
            "color": self.color.to_json(),
        })
    }
}

impl JsonSer for TraceResult {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "segments": self.segments.to_json(),
            "edge_hits": self.edge_hits.to_json(),
        })
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON object.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl JsonDes for Point {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        json.as_array()
            .and_then(|array| json_array_to_point(array))
            .ok_or_else(|| "a point must be an array of 2 numbers".into())
    }
}

impl JsonDes for Color {
    /// An array of 3 integers in `0..=255`.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let array: &[serde_json::Value; 3] = json
            .as_array()
            .and_then(|array| array.as_slice().try_into().ok())
            .ok_or("a color must be an array of 3 numbers")?;

        let mut rgb = [0; 3];
        for (channel, value) in rgb.iter_mut().zip(array) {
            *channel = value
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or("color channels must be integers between 0 and 255")?;
        }
        Ok(Self::from_rgb(rgb))
    }
}

impl JsonDes for Light {
    /// Deserialize a new light from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "id": "67e55044-10b1-426f-9247-bb680e5fe0c8", // (optional, generated if missing)
    ///     "position": [1., 2.],
    ///     "angle": 45., // (degrees, optional, defaults to 0)
    ///     "color": [255, 0, 0], // (optional, defaults to red)
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let mut light = Self::new(point_field(json, "position")?);
        light.id = id_field(json)?;

        if json.get("angle").is_some() {
            light.angle = float_field(json, "angle")?;
        }
        if let Some(color) = json.get("color") {
            light.color = Color::from_json(color)?;
        }
        Ok(light)
    }
}

impl<K> JsonDes for Panel<K> {
    /// Deserialize a new mirror or flag from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "id": "67e55044-10b1-426f-9247-bb680e5fe0c8", // (optional, generated if missing)
    ///     "position": [1., 2.],
    ///     "angle": 45., // (degrees, optional, defaults to 0)
    ///     "length": 150., // (optional, defaults to 150, must be positive)
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let mut panel = Self::with_id(id_field(json)?, point_field(json, "position")?);

        if json.get("angle").is_some() {
            panel.angle = float_field(json, "angle")?;
        }
        if json.get("length").is_some() {
            let length = float_field(json, "length")?;
            if !(length > 0.0 && length.is_finite()) {
                return Err("\"length\" must be a positive number".into());
            }
            panel.length = length;
        }
        Ok(panel)
    }
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

impl JsonDes for Scene {
    /// Deserialize a new scene from a JSON object.
    ///
    /// ```json
    /// {
    ///     "width": 800.,
    ///     "height": 600.,
    ///     "lights": [ /* lights */ ],
    ///     "mirrors": [ /* mirrors */ ],
    ///     "flags": [ /* flags */ ],
    /// }
    /// ```
    ///
    /// Missing object lists are empty. Every object is loaded unselected, and
    /// an object whose id repeats an earlier one is given a fresh id.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let width = float_field(json, "width")?;
        let height = float_field(json, "height")?;
        if !(width > 0.0 && height > 0.0) {
            return Err("canvas dimensions must be positive".into());
        }

        fn list<T: JsonDes + JsonType>(
            json: &serde_json::Value,
            key: &str,
        ) -> Result<Vec<T>, Box<dyn Error>> {
            json.get(key).map_or(Ok(Vec::new()), |items| {
                Vec::from_json(items)
                    .map_err(|e| Box::<dyn Error>::from(format!("invalid {}: {e}", T::json_type())))
            })
        }

        Ok(Self::from_parts(
            Bounds::new(width, height),
            list(json, "lights")?,
            list(json, "mirrors")?,
            list(json, "flags")?,
        ))
    }
}

pub fn serialize_scene(scene: &Scene) -> serde_json::Value {
    scene.to_json()
}

pub fn deserialize_scene(json: &serde_json::Value) -> Result<Scene, Box<dyn Error>> {
    Scene::from_json(json)
}

/// The light paths of every light, in the scene's order.
pub fn serialize_trace<'a>(
    results: impl IntoIterator<Item = &'a TraceResult>,
) -> serde_json::Value {
    serde_json::Value::Array(Vec::from_iter(
        results.into_iter().map(TraceResult::to_json),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scene_round_trip_keeps_ids_and_attributes() {
        let mut scene = Scene::new(Bounds::new(640.0, 480.0));
        scene.push_light(Light::new([10.0, 20.0]).with_angle(30.0).with_color(Color::CYAN));
        scene.push_mirror(Mirror::new([100.0, 200.0]).with_angle(45.0).with_length(90.0));
        scene.push_flag(Flag::new([300.0, 50.0]).with_angle(-10.0));

        let loaded = deserialize_scene(&serialize_scene(&scene)).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let scene = deserialize_scene(&json!({
            "width": 100,
            "height": 100,
            "mirrors": [{ "position": [50, 50] }],
        }))
        .unwrap();

        assert!(scene.lights().is_empty());
        assert!(scene.flags().is_empty());
        let mirror = &scene.mirrors()[0];
        assert_eq!(mirror.length, DEFAULT_PANEL_LENGTH);
        assert_eq!(mirror.angle, 0.0);
        assert!(!mirror.selected);
    }

    #[test]
    fn light_fields_are_read() {
        let light = Light::from_json(&json!({
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "position": [1.5, -2],
            "angle": 90,
            "color": [0, 128, 255],
        }))
        .unwrap();

        assert_eq!(light.id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(light.position, Point::new(1.5, -2.0));
        assert_eq!(light.angle, 90.0);
        assert_eq!(light.color, Color::from_rgb([0, 128, 255]));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Color::from_json(&json!([256, 0, 0])).is_err());
        assert!(Color::from_json(&json!([1, 2])).is_err());
        assert!(Light::from_json(&json!({ "position": [1] })).is_err());
        assert!(Light::from_json(&json!({ "position": [1, 2], "id": "nope" })).is_err());
        assert!(Mirror::from_json(&json!({ "position": [1, 2], "length": -3 })).is_err());
        assert!(deserialize_scene(&json!({ "width": 0, "height": 10 })).is_err());
        assert!(deserialize_scene(&json!({ "width": 10, "height": 10, "flags": 3 })).is_err());
    }

    #[test]
    fn repeated_ids_load_as_distinct_objects() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let scene = deserialize_scene(&json!({
            "width": 800,
            "height": 600,
            "mirrors": [
                { "id": id, "position": [100, 100] },
                { "id": id, "position": [500, 400] },
            ],
        }))
        .unwrap();

        assert_eq!(scene.mirrors()[0].id.to_string(), id);
        assert_ne!(scene.mirrors()[0].id, scene.mirrors()[1].id);

        let mut canvas = Canvas::from_scene(scene);
        canvas.pointer_down(&Point::new(500.0, 400.0));
        canvas.pointer_move(&Point::new(520.0, 400.0));
        canvas.pointer_up();

        let mirrors = canvas.scene().mirrors();
        assert_eq!(mirrors[0].position, Point::new(100.0, 100.0));
        assert_eq!(mirrors[1].position, Point::new(520.0, 400.0));
        assert!(mirrors[1].selected);
        assert!(!mirrors[0].selected);
    }

    #[test]
    fn trace_is_serialized_per_light() {
        let mut scene = Scene::new(Bounds::new(400.0, 300.0));
        scene.push_light(Light::new([200.0, 150.0]));
        let traces = trace_scene(&scene, TraceParams::default());

        let json = serialize_trace(&traces);
        assert_eq!(
            json,
            json!([{
                "segments": [{ "start": [200.0, 150.0], "end": [400.0, 150.0], "color": [255, 0, 0] }],
                "edge_hits": [{ "point": [400.0, 150.0], "color": [255, 0, 0] }],
            }])
        );
    }

    #[test]
    fn json_types_name_the_objects() {
        assert_eq!(Light::json_type(), "light");
        assert_eq!(Flag::json_type(), "flag");
        assert_eq!(<[Mirror]>::json_type(), "[]mirror");
    }
}

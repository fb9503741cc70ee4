use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lumen_assets::{ObjOptions, load_obj};
use lumen_render::{DebugTextRenderer, Renderer};
use lumen_scene::{Scene, SceneConfig};
use lumen_tools::SceneInspector;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen-cli", about = "CLI tool for lumen scenes and meshes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load an OBJ file and print its statistics
    Obj {
        path: PathBuf,
        /// Convert to left-handed coordinates while loading
        #[arg(long)]
        left_handed: bool,
        /// Keep texture V as stored in the file
        #[arg(long)]
        no_flip_v: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load a scene description and report what it contains
    Validate { path: PathBuf },
    /// Describe a scene (the demo scene when no path is given)
    Dump {
        #[arg(short, long)]
        scene: Option<PathBuf>,
    },
    /// Print the demo scene as YAML
    DemoYaml,
}

#[derive(Debug, Serialize)]
struct ObjReport {
    path: String,
    vertices: usize,
    indices: usize,
    triangles: usize,
    bounds_min: Option<[f32; 3]>,
    bounds_max: Option<[f32; 3]>,
}

fn obj_report(path: &Path, options: &ObjOptions) -> anyhow::Result<ObjReport> {
    let mesh = load_obj(path, options).with_context(|| format!("loading {}", path.display()))?;
    let bounds = mesh.bounds();
    Ok(ObjReport {
        path: path.display().to_string(),
        vertices: mesh.vertex_count(),
        indices: mesh.index_count(),
        triangles: mesh.triangle_count(),
        bounds_min: bounds.map(|(min, _)| min.to_array()),
        bounds_max: bounds.map(|(_, max)| max.to_array()),
    })
}

fn load_scene(path: Option<&Path>) -> anyhow::Result<Scene> {
    match path {
        Some(path) => {
            Scene::load(path).with_context(|| format!("loading scene {}", path.display()))
        }
        None => Ok(Scene::demo()?),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("lumen-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", lumen_render::crate_info());
            println!("input: {}", lumen_input::crate_info());
            println!("tools: {}", lumen_tools::crate_info());
        }
        Commands::Obj {
            path,
            left_handed,
            no_flip_v,
            json,
        } => {
            let options = ObjOptions {
                flip_v: !no_flip_v,
                to_left_handed: left_handed,
            };
            let report = obj_report(&path, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.path);
                println!(
                    "  vertices={} indices={} triangles={}",
                    report.vertices, report.indices, report.triangles
                );
                if let (Some(min), Some(max)) = (report.bounds_min, report.bounds_max) {
                    println!("  bounds min={min:?} max={max:?}");
                }
            }
        }
        Commands::Validate { path } => {
            let scene = load_scene(Some(&path))?;
            println!("{}: ok", path.display());
            println!("{}", SceneInspector::summary(&scene));
            for stats in SceneInspector::mesh_stats(&scene) {
                println!("  {stats}");
            }
        }
        Commands::Dump { scene } => {
            let scene = load_scene(scene.as_deref())?;
            print!("{}", DebugTextRenderer::new().render(&scene));
        }
        Commands::DemoYaml => {
            print!("{}", SceneConfig::demo().to_yaml_string()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_obj_flags() {
        let cli = Cli::try_parse_from(["lumen-cli", "obj", "cube.obj", "--json", "--left-handed"])
            .unwrap();
        match cli.command {
            Commands::Obj {
                path,
                left_handed,
                no_flip_v,
                json,
            } => {
                assert_eq!(path, PathBuf::from("cube.obj"));
                assert!(left_handed);
                assert!(!no_flip_v);
                assert!(json);
            }
            _ => panic!("expected obj command"),
        }
    }

    #[test]
    fn obj_report_counts_a_quad() {
        let mut file = tempfile::NamedTempFile::with_suffix(".obj").unwrap();
        writeln!(
            file,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1 4/4/1"
        )
        .unwrap();

        let report = obj_report(file.path(), &ObjOptions::default()).unwrap();
        assert_eq!(report.triangles, 2);
        assert_eq!(report.bounds_min, Some([0.0, 0.0, 0.0]));
        assert_eq!(report.bounds_max, Some([1.0, 1.0, 0.0]));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["triangles"], 2);
    }

    #[test]
    fn missing_obj_is_an_error() {
        assert!(obj_report(Path::new("/no/such/file.obj"), &ObjOptions::default()).is_err());
    }

    #[test]
    fn demo_scene_loads_without_a_path() {
        let scene = load_scene(None).unwrap();
        assert_eq!(scene.entity_count(), 12);
    }

    #[test]
    fn dumped_demo_yaml_validates() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(SceneConfig::demo().to_yaml_string().unwrap().as_bytes())
            .unwrap();
        let scene = load_scene(Some(file.path())).unwrap();
        assert_eq!(scene.cameras().len(), 2);
    }
}

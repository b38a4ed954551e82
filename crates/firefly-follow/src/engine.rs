//! Spring-damper follow physics for UI text elements

use crate::config::{FollowConfig, FollowConfigPatch};
use firefly_core::{
    ElementKey, ElementTransform, FireflyError, LayoutSnapshot, Result, Selector, TransformSink, Vec2, Vec3,
};
use std::collections::BTreeMap;

/// Letters use a stiffer spring than their parent element
const LETTER_STIFFNESS: f32 = 1.2;
/// Stagger between consecutive letters, seconds
const LETTER_DELAY: f32 = 0.02;

/// Identifies a registered element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FollowHandle(u64);

/// Physics state of one sub-letter
#[derive(Clone, Debug)]
pub struct FollowLetter {
    pub key: ElementKey,
    origin: Vec2,
    current: Vec2,
    velocity: Vec2,
    rotation: f32,
    scale: f32,
    delay: f32,
    amplitude: f32,
}

impl FollowLetter {
    fn new(key: ElementKey, center: Vec2, index: usize) -> Self {
        Self {
            key,
            origin: center,
            current: center,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            delay: index as f32 * LETTER_DELAY,
            amplitude: 1.0 + (index % 3) as f32 * 0.2,
        }
    }

    fn step(&mut self, pointer: Option<Vec2>, config: &FollowConfig, elapsed: f32) {
        let mut influence = 0.0;
        if let Some(p) = pointer {
            let delta = p - self.current;
            influence = (1.0 - delta.length() / config.influence_radius).max(0.0) * self.amplitude;
            if influence > 0.0 {
                self.velocity += delta * (influence * config.spring_stiffness * LETTER_STIFFNESS);
            }
        }

        let back = self.origin - self.current;
        self.velocity += back * (config.return_force * (1.0 + self.delay));
        self.velocity *= config.damping;
        self.current += self.velocity;

        self.rotation = self.velocity.x * config.rotation_effect * 2.0;
        self.scale = 1.0 + influence * 0.1 * (elapsed + self.delay * 10.0).sin();
    }

    pub fn displacement(&self) -> Vec2 {
        self.current - self.origin
    }

    pub fn transform(&self) -> ElementTransform {
        let d = self.displacement();
        ElementTransform {
            translate: Vec3::new(d.x, d.y, 0.0),
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

/// Physics state of one registered element
#[derive(Clone, Debug)]
pub struct FollowElement {
    pub key: ElementKey,
    /// Options named at registration; everything else tracks the engine
    overrides: FollowConfigPatch,
    config: FollowConfig,
    origin: Vec2,
    current: Vec2,
    velocity: Vec2,
    rotation: f32,
    influence: f32,
    letters: Vec<FollowLetter>,
}

impl FollowElement {
    fn step(&mut self, pointer: Option<Vec2>) {
        let c = &self.config;

        let mut influence = 0.0;
        if let Some(p) = pointer {
            let delta = p - self.current;
            let distance = delta.length();
            influence = (1.0 - distance / c.influence_radius).max(0.0);
            if influence > 0.0 {
                let mut stiffness = c.spring_stiffness;
                if distance < c.min_distance {
                    stiffness += c.stickiness * (1.0 - distance / c.min_distance);
                }
                // delta is zero when the pointer sits on the element: no pull
                self.velocity += delta * (influence * stiffness);
            }
        }

        let back = self.origin - self.current;
        let pull = c.return_force * (1.0 + back.length() / c.max_displacement);
        self.velocity += back * pull;

        self.velocity *= c.damping;
        self.current += self.velocity;

        let offset = self.current - self.origin;
        let distance = offset.length();
        if distance > c.max_displacement {
            self.current = self.origin + offset * (c.max_displacement / distance);
        }

        self.rotation = self.velocity.x * c.rotation_effect;
        self.influence = influence;
    }

    /// Move the rest position, carrying the current position along
    fn rebase(&mut self, rest: Vec2) {
        let shift = rest - self.origin;
        if shift.length() > 0.0 {
            self.origin = rest;
            self.current += shift;
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn displacement(&self) -> Vec2 {
        self.current - self.origin
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn influence(&self) -> f32 {
        self.influence
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    pub fn letters(&self) -> &[FollowLetter] {
        &self.letters
    }

    pub fn transform(&self) -> ElementTransform {
        let d = self.displacement();
        ElementTransform {
            translate: Vec3::new(d.x, d.y, self.influence * 20.0 * self.config.z_depth),
            rotation: self.rotation,
            scale: 1.0 + self.influence * 0.08,
        }
    }
}

/// Registry of follow elements driven by one pointer
pub struct TextFollowEngine {
    config: FollowConfig,
    elements: BTreeMap<FollowHandle, FollowElement>,
    next_handle: u64,
    elapsed: f32,
}

impl TextFollowEngine {
    pub fn new(config: FollowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            elements: BTreeMap::new(),
            next_handle: 1,
            elapsed: 0.0,
        })
    }

    /// Start following `key`. Its rest position is its layout center;
    /// its sub-letters, if any, follow with their own lighter springs.
    pub fn register(
        &mut self,
        key: &ElementKey,
        layout: &LayoutSnapshot,
        overrides: FollowConfigPatch,
    ) -> Result<FollowHandle> {
        let node = layout
            .get(key)
            .ok_or_else(|| FireflyError::UnknownElement(key.to_string()))?;
        let config = self.config.merged(&overrides);
        config.validate()?;

        let letters = node
            .letters
            .iter()
            .enumerate()
            .filter_map(|(i, letter)| match layout.rect(letter) {
                Some(rect) => Some(FollowLetter::new(letter.clone(), rect.center(), i)),
                None => {
                    log::debug!("Letter '{letter}' of '{key}' is not in the layout, skipping");
                    None
                }
            })
            .collect();

        let center = node.rect.center();
        let handle = FollowHandle(self.next_handle);
        self.next_handle += 1;
        self.elements.insert(
            handle,
            FollowElement {
                key: key.clone(),
                overrides,
                config,
                origin: center,
                current: center,
                velocity: Vec2::ZERO,
                rotation: 0.0,
                influence: 0.0,
                letters,
            },
        );
        Ok(handle)
    }

    /// Register every layout element matching `selector`
    pub fn register_selector(
        &mut self,
        selector: &str,
        layout: &LayoutSnapshot,
        overrides: &FollowConfigPatch,
    ) -> Result<Vec<FollowHandle>> {
        let selector = Selector::parse(selector)?;
        let keys: Vec<ElementKey> = layout.select(&selector).map(|n| n.key.clone()).collect();
        keys.iter()
            .map(|key| self.register(key, layout, overrides.clone()))
            .collect()
    }

    /// Stop following and clear the element's and its letters' transforms.
    /// Returns false for an unknown handle.
    pub fn unregister(&mut self, handle: FollowHandle, sink: &mut dyn TransformSink) -> bool {
        match self.elements.remove(&handle) {
            Some(element) => {
                reset_element(&element, sink);
                true
            }
            None => false,
        }
    }

    /// Advance every element one tick.
    ///
    /// `pointer` is in screen pixels. Elements no longer in `layout` are
    /// dropped; letters missing from it are skipped this tick.
    pub fn update(&mut self, dt: f32, pointer: Option<Vec2>, layout: &LayoutSnapshot) {
        self.elapsed += dt;
        let elapsed = self.elapsed;

        self.elements.retain(|_, element| {
            let Some(node) = layout.get(&element.key) else {
                log::debug!("Follow element '{}' left the layout, dropping", element.key);
                return false;
            };
            element.rebase(node.rect.center());
            element.step(pointer);

            let config = &element.config;
            for letter in &mut element.letters {
                if let Some(rect) = layout.rect(&letter.key) {
                    let rest = rect.center();
                    let shift = rest - letter.origin;
                    letter.origin = rest;
                    letter.current += shift;
                    letter.step(pointer, config, elapsed);
                }
            }
            true
        });
    }

    /// Re-read every rest position from `layout` without stepping physics
    pub fn resync(&mut self, layout: &LayoutSnapshot) {
        for element in self.elements.values_mut() {
            if let Some(rect) = layout.rect(&element.key) {
                element.rebase(rect.center());
            }
            for letter in &mut element.letters {
                if let Some(rect) = layout.rect(&letter.key) {
                    let shift = rect.center() - letter.origin;
                    letter.origin = rect.center();
                    letter.current += shift;
                }
            }
        }
    }

    /// Write every element's and letter's transform to the sink
    pub fn apply_to(&self, sink: &mut dyn TransformSink) {
        for element in self.elements.values() {
            sink.apply(&element.key, &element.transform());
            for letter in &element.letters {
                sink.apply(&letter.key, &letter.transform());
            }
        }
    }

    /// Patch the engine defaults. Each element keeps the options it named at
    /// registration and picks up the rest.
    pub fn set_config(&mut self, patch: &FollowConfigPatch) -> Result<()> {
        let next = self.config.merged(patch);
        if let Err(e) = next.validate() {
            log::warn!("Rejected follow config patch: {e}");
            return Err(e);
        }
        self.config = next;
        for element in self.elements.values_mut() {
            element.config = self.config.merged(&element.overrides);
        }
        Ok(())
    }

    /// Unregister everything, resetting every transform
    pub fn clear(&mut self, sink: &mut dyn TransformSink) {
        for element in std::mem::take(&mut self.elements).into_values() {
            reset_element(&element, sink);
        }
    }

    pub fn get(&self, handle: FollowHandle) -> Option<&FollowElement> {
        self.elements.get(&handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = FollowHandle> + '_ {
        self.elements.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }
}

fn reset_element(element: &FollowElement, sink: &mut dyn TransformSink) {
    sink.reset(&element.key);
    for letter in &element.letters {
        sink.reset(&letter.key);
    }
}

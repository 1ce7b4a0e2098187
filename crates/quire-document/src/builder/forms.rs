//! Forms and their controls.
//!
//! Controls become widget cells sized from their labels. The values live in
//! the [`FormSet`]; [`sync_widgets`] copies the selection state back into
//! the widget cells after it changes.

use std::str::FromStr;

use quire_cells::{Cell, CellKind, CellTree, ContainerData, WidgetCell, WidgetKind};
use quire_common::warning::warn_once;
use quire_markup::Attributes;

use super::{Tag, TreeBuilder};
use crate::error::BuildError;
use crate::forms::{ElementKind, FormElement, FormSet, Method};

/// Horizontal padding inside a button or drop-down, per side.
const WIDGET_PADDING: i32 = 6;

/// Vertical padding inside a control, per side.
const WIDGET_PADDING_V: i32 = 2;

/// A control whose end tag has not been seen yet.
#[derive(Debug, Clone)]
pub(super) enum ControlFrame {
    /// Inside `<select>`, possibly inside one of its `<option>`s.
    Select {
        form: usize,
        element: usize,
        option: Option<OptionFrame>,
    },
    /// Inside `<radiobox>`; the content is the label.
    Radio {
        form: usize,
        name: String,
        value: Option<String>,
        checked: bool,
        label: String,
    },
}

/// An open `<option>`.
#[derive(Debug, Clone)]
pub(super) struct OptionFrame {
    value: Option<String>,
    selected: bool,
    label: String,
}

impl ControlFrame {
    /// Where text inside the control goes, if anywhere.
    pub(super) fn label_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Select {
                option: Some(option),
                ..
            } => Some(&mut option.label),
            Self::Select { option: None, .. } => None,
            Self::Radio { label, .. } => Some(label),
        }
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Copy the selection state of every form element into its widget cells.
pub fn sync_widgets(tree: &mut CellTree, forms: &FormSet) {
    let widgets: Vec<_> = tree
        .terminals(tree.root())
        .filter(|&id| matches!(tree[id].kind, CellKind::Widget(_)))
        .collect();
    for id in widgets {
        let CellKind::Widget(widget) = &mut tree[id].kind else {
            continue;
        };
        let Some(element) = forms
            .get(widget.form)
            .and_then(|form| form.elements.get(widget.element))
        else {
            continue;
        };
        match widget.kind {
            WidgetKind::RadioBox => widget.checked = element.selected == Some(widget.option),
            WidgetKind::ComboBox => {
                widget.label = element.label().unwrap_or_default().to_string();
            }
            WidgetKind::Button => {}
        }
    }
}

impl TreeBuilder<'_> {
    fn form_context(&self, tag: Tag) -> Result<usize, BuildError> {
        self.form
            .ok_or_else(|| BuildError::MissingFormContext(tag.to_string()))
    }

    /// The form for a control that has content, which may not nest.
    fn control_context(&self, tag: Tag) -> Result<usize, BuildError> {
        let form = self.form_context(tag)?;
        if self.control.is_some() {
            return Err(BuildError::NestedControl(tag.to_string()));
        }
        Ok(form)
    }

    fn form_element(&mut self, form: usize, element: FormElement) -> usize {
        self.forms
            .get_mut(form)
            .map_or(0, |form| form.add_element(element))
    }

    /// Append a widget cell. `widest` is the longest text the control has
    /// to show.
    fn push_widget(&mut self, widget: WidgetCell, widest: &str) {
        let font = self.ctx.realize(self.fonts.current());
        let extent = self.ctx.measure(widest, font);
        let line = self.ctx.measure(" ", font);
        let height = line.height + 2 * WIDGET_PADDING_V;
        let width = match widget.kind {
            WidgetKind::Button => extent.width + 2 * WIDGET_PADDING,
            // Room for the drop-down arrow.
            WidgetKind::ComboBox => extent.width + 2 * WIDGET_PADDING + height,
            WidgetKind::RadioBox => height + 2 + extent.width,
        };
        let mut cell = Cell::sized(CellKind::Widget(widget), width, height);
        cell.descent = line.descent + WIDGET_PADDING_V;
        let _ = self.push_inline(cell, Some(font));
    }

    /// `<form action method>` opens a block holding the controls.
    pub(super) fn open_form(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        if self.form.is_some() {
            return Err(BuildError::NestedForm);
        }
        let method = match attrs.get("method") {
            Some(value) => Method::from_str(value.trim()).unwrap_or_else(|_| {
                let _ = warn_once("builder", &format!("unknown form method \"{value}\", using GET"));
                Method::Get
            }),
            None => Method::Get,
        };
        let action = attrs.get("action").cloned().unwrap_or_default();
        self.open_block(Tag::Form, ContainerData::default())?;
        self.form = Some(self.forms.add(action, method));
        Ok(())
    }

    pub(super) fn close_form(&mut self) -> Result<(), BuildError> {
        self.form = None;
        self.close_block(Tag::Form)
    }

    /// `<input type="submit">` is a button, `<input type="hidden">` only a
    /// value.
    pub(super) fn input(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let form = self.form_context(Tag::Input)?;
        let name = attrs.get("name").cloned().unwrap_or_default();
        let kind = attrs.get("type").map_or("submit", |kind| kind.trim());
        if kind.eq_ignore_ascii_case("hidden") {
            let mut element = FormElement::new(name, ElementKind::Hidden);
            let value = attrs.get("value").cloned().unwrap_or_default();
            let _ = element.add_option(value, "", true);
            let _ = self.form_element(form, element);
        } else if kind.eq_ignore_ascii_case("submit") {
            let label = attrs
                .get("value")
                .cloned()
                .unwrap_or_else(|| "Submit".to_string());
            let mut element = FormElement::new(name, ElementKind::Submit);
            let _ = element.add_option(label.clone(), label.clone(), true);
            let element = self.form_element(form, element);
            let widget = WidgetCell {
                form,
                element,
                option: 0,
                kind: WidgetKind::Button,
                label: label.clone(),
                checked: false,
            };
            self.push_widget(widget, &label);
        } else {
            let _ = warn_once("builder", &format!("ignoring <input type=\"{kind}\">"));
        }
        Ok(())
    }

    pub(super) fn open_select(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let form = self.control_context(Tag::Select)?;
        let name = attrs.get("name").cloned().unwrap_or_default();
        let element = self.form_element(form, FormElement::new(name, ElementKind::Select));
        self.control = Some(ControlFrame::Select {
            form,
            element,
            option: None,
        });
        Ok(())
    }

    pub(super) fn open_option(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let Some(ControlFrame::Select { option, .. }) = &mut self.control else {
            return Err(BuildError::OptionOutsideSelect);
        };
        if option.is_some() {
            return Err(BuildError::NestedControl(Tag::SelectOption.to_string()));
        }
        *option = Some(OptionFrame {
            value: attrs.get("value").cloned(),
            selected: attrs.contains_key("selected"),
            label: String::new(),
        });
        Ok(())
    }

    pub(super) fn close_option(&mut self) -> Result<(), BuildError> {
        let Some(ControlFrame::Select {
            form,
            element,
            option,
        }) = &mut self.control
        else {
            return Err(BuildError::OptionOutsideSelect);
        };
        let (form, element) = (*form, *element);
        let Some(option) = option.take() else {
            return Err(BuildError::OptionOutsideSelect);
        };
        let label = collapse(&option.label);
        let value = option.value.unwrap_or_else(|| label.clone());
        if let Some(target) = self
            .forms
            .get_mut(form)
            .and_then(|form| form.elements.get_mut(element))
        {
            let _ = target.add_option(value, label, option.selected);
        }
        Ok(())
    }

    /// The drop-down is created once all options are known, as wide as the
    /// widest of them.
    pub(super) fn close_select(&mut self) -> Result<(), BuildError> {
        let Some(ControlFrame::Select { form, element, .. }) = self.control.take() else {
            return Err(BuildError::MissingFormContext(Tag::Select.to_string()));
        };
        let Some(target) = self
            .forms
            .get(form)
            .and_then(|form| form.elements.get(element))
        else {
            return Ok(());
        };
        let widest = target
            .options
            .iter()
            .map(|(_, label)| label.as_str())
            .max_by_key(|label| label.chars().count())
            .unwrap_or_default()
            .to_string();
        let widget = WidgetCell {
            form,
            element,
            option: 0,
            kind: WidgetKind::ComboBox,
            label: target.label().unwrap_or_default().to_string(),
            checked: false,
        };
        self.push_widget(widget, &widest);
        Ok(())
    }

    /// `<radiobox name value checked>label</radiobox>`. Radio boxes sharing
    /// a name form one element.
    pub(super) fn open_radio(&mut self, attrs: &Attributes) -> Result<(), BuildError> {
        let form = self.control_context(Tag::Radiobox)?;
        self.control = Some(ControlFrame::Radio {
            form,
            name: attrs.get("name").cloned().unwrap_or_default(),
            value: attrs.get("value").cloned(),
            checked: attrs.contains_key("checked"),
            label: String::new(),
        });
        Ok(())
    }

    pub(super) fn close_radio(&mut self) -> Result<(), BuildError> {
        let Some(ControlFrame::Radio {
            form,
            name,
            value,
            checked,
            label,
        }) = self.control.take()
        else {
            return Err(BuildError::MissingFormContext(Tag::Radiobox.to_string()));
        };
        let label = collapse(&label);
        let value = value.unwrap_or_else(|| label.clone());
        let Some(target) = self.forms.get_mut(form) else {
            return Ok(());
        };
        let element = match target.find_element(&name, ElementKind::Radio) {
            Some(element) => element,
            None => target.add_element(FormElement::new(name, ElementKind::Radio)),
        };
        let option = target.elements[element].add_option(value, label.clone(), checked);
        let widget = WidgetCell {
            form,
            element,
            option,
            kind: WidgetKind::RadioBox,
            label: label.clone(),
            checked,
        };
        self.push_widget(widget, &label);
        Ok(())
    }
}
